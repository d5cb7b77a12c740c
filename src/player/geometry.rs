/// Rect math shared by the geometry builtins and sprite bounds.
pub type IntRect = (i32, i32, i32, i32);
pub type IntPoint = (i32, i32);

pub fn rect_width(rect: &IntRect) -> i32 {
    rect.2 - rect.0
}

pub fn rect_height(rect: &IntRect) -> i32 {
    rect.3 - rect.1
}

pub fn rect_union(a: &IntRect, b: &IntRect) -> IntRect {
    (
        a.0.min(b.0),
        a.1.min(b.1),
        a.2.max(b.2),
        a.3.max(b.3),
    )
}

pub fn rect_intersect(a: &IntRect, b: &IntRect) -> IntRect {
    let result = (
        a.0.max(b.0),
        a.1.max(b.1),
        a.2.min(b.2),
        a.3.min(b.3),
    );
    if result.0 >= result.2 || result.1 >= result.3 {
        (0, 0, 0, 0)
    } else {
        result
    }
}

pub fn point_inside(point: &IntPoint, rect: &IntRect) -> bool {
    point.0 >= rect.0 && point.0 < rect.2 && point.1 >= rect.1 && point.1 < rect.3
}

/// Projects a point from `src` space into `dst` space, scaling linearly.
pub fn point_map(point: &IntPoint, src: &IntRect, dst: &IntRect) -> IntPoint {
    let sw = rect_width(src).max(1);
    let sh = rect_height(src).max(1);
    (
        dst.0 + (point.0 - src.0) * rect_width(dst) / sw,
        dst.1 + (point.1 - src.1) * rect_height(dst) / sh,
    )
}

pub fn rect_map(rect: &IntRect, src: &IntRect, dst: &IntRect) -> IntRect {
    let tl = point_map(&(rect.0, rect.1), src, dst);
    let br = point_map(&(rect.2, rect.3), src, dst);
    (tl.0, tl.1, br.0, br.1)
}

pub fn rect_offset(rect: &IntRect, dh: i32, dv: i32) -> IntRect {
    (rect.0 + dh, rect.1 + dv, rect.2 + dh, rect.3 + dv)
}
