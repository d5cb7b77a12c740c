use log::warn;

use crate::director::lingo::datum::{datum_bool, Datum};

use super::cast_lib::{CastMemberRef, NULL_CAST_MEMBER_REF};
use super::script::InstanceId;
use super::ScriptError;

/// One sprite channel's mutable state. Puppeted sprites ignore the score
/// while a script drives them.
pub struct Sprite {
    pub number: usize,
    pub puppet: bool,
    pub visible: bool,
    pub member: Option<CastMemberRef>,
    pub loc_h: i32,
    pub loc_v: i32,
    pub loc_z: i32,
    pub width: i32,
    pub height: i32,
    pub ink: i32,
    pub blend: i32,
    pub fore_color: i32,
    pub back_color: i32,
    pub script_instance_list: Vec<InstanceId>,
}

impl Sprite {
    pub fn new(number: usize) -> Sprite {
        Sprite {
            number,
            puppet: false,
            visible: true,
            member: None,
            loc_h: 0,
            loc_v: 0,
            loc_z: number as i32,
            width: 0,
            height: 0,
            ink: 0,
            blend: 100,
            fore_color: 255,
            back_color: 0,
            script_instance_list: Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        let number = self.number;
        *self = Sprite::new(number);
    }

    pub fn rect(&self) -> (i32, i32, i32, i32) {
        (
            self.loc_h,
            self.loc_v,
            self.loc_h + self.width,
            self.loc_v + self.height,
        )
    }

    pub fn get_prop(&self, prop_name: &str) -> Result<Datum, ScriptError> {
        match prop_name {
            "spriteNum" => Ok(Datum::Int(self.number as i32)),
            "puppet" => Ok(datum_bool(self.puppet)),
            "visible" | "visibility" => Ok(datum_bool(self.visible)),
            "member" => Ok(Datum::CastMember(
                self.member.unwrap_or(NULL_CAST_MEMBER_REF),
            )),
            "castNum" => Ok(Datum::Int(
                self.member.map(|m| m.slot_number()).unwrap_or(0),
            )),
            "loc" => Ok(Datum::IntPoint((self.loc_h, self.loc_v))),
            "locH" => Ok(Datum::Int(self.loc_h)),
            "locV" => Ok(Datum::Int(self.loc_v)),
            "locZ" => Ok(Datum::Int(self.loc_z)),
            "width" => Ok(Datum::Int(self.width)),
            "height" => Ok(Datum::Int(self.height)),
            "rect" => Ok(Datum::IntRect(self.rect())),
            "left" => Ok(Datum::Int(self.loc_h)),
            "top" => Ok(Datum::Int(self.loc_v)),
            "right" => Ok(Datum::Int(self.loc_h + self.width)),
            "bottom" => Ok(Datum::Int(self.loc_v + self.height)),
            "ink" => Ok(Datum::Int(self.ink)),
            "blend" => Ok(Datum::Int(self.blend)),
            "foreColor" => Ok(Datum::Int(self.fore_color)),
            "backColor" => Ok(Datum::Int(self.back_color)),
            "scriptNum" => Ok(Datum::Int(0)),
            _ => Err(ScriptError::TypeMismatch(format!(
                "unknown sprite property {prop_name}"
            ))),
        }
    }

    /// Unknown property names are accepted and logged; the sprite state
    /// stays consistent either way.
    pub fn set_prop(&mut self, prop_name: &str, value: &Datum) -> Result<(), ScriptError> {
        match prop_name {
            "puppet" => self.puppet = value.bool_value(),
            "visible" | "visibility" => self.visible = value.bool_value(),
            "member" => match value {
                Datum::CastMember(member_ref) => self.member = Some(*member_ref),
                Datum::Int(slot) => self.member = Some(CastMemberRef::from_slot_number(*slot)),
                _ => {
                    return Err(ScriptError::TypeMismatch(
                        "sprite member must be a cast member".to_string(),
                    ))
                }
            },
            "loc" => {
                let (x, y) = value.to_int_point()?;
                self.loc_h = x;
                self.loc_v = y;
            }
            "locH" => self.loc_h = value.int_value()?,
            "locV" => self.loc_v = value.int_value()?,
            "locZ" => self.loc_z = value.int_value()?,
            "width" => self.width = value.int_value()?,
            "height" => self.height = value.int_value()?,
            "rect" => {
                let (l, t, r, b) = value.to_int_rect()?;
                self.loc_h = l;
                self.loc_v = t;
                self.width = r - l;
                self.height = b - t;
            }
            "ink" => self.ink = value.int_value()?,
            "blend" => self.blend = value.int_value()?,
            "foreColor" => self.fore_color = value.int_value()?,
            "backColor" => self.back_color = value.int_value()?,
            other => {
                warn!("ignoring write to unknown sprite property {other}");
            }
        }
        Ok(())
    }
}
