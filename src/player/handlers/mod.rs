pub mod geometry;
pub mod list;
pub mod math;
pub mod movie;
pub mod net;
pub mod sound;
pub mod string;
pub mod types;

use super::allocator::DatumRef;
use super::{Player, ScriptError};

type BuiltinResult = Result<DatumRef, ScriptError>;

/// The global built-in handler surface. Names are case-insensitive, like
/// everything else in Lingo.
pub fn has_builtin(name: &str) -> bool {
    BUILTIN_NAMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(name))
}

const BUILTIN_NAMES: &[&str] = &[
    "abs", "sqrt", "sin", "cos", "tan", "atan", "exp", "log", "power", "random", "pi", "max",
    "min", "integer", "float", "string", "symbol", "value", "length", "chars", "char", "word",
    "item", "line", "count", "offset", "charToNum", "numToChar", "space", "list", "getAt",
    "setAt", "add", "addAt", "append", "deleteAt", "deleteOne", "getOne", "getPos", "sort",
    "duplicate", "getLast", "deleteLast", "deleteAll", "getProp", "setProp", "addProp",
    "deleteProp", "findPos", "findPosNear", "getPropAt", "getaProp", "setaProp", "point", "rect",
    "union", "intersect", "inside", "map", "sound", "puppetSound", "playSound", "stopSound",
    "soundBusy", "soundLevel", "beep", "put", "alert", "halt", "nothing", "pass", "ilk",
    "objectP", "listP", "stringP", "symbolP", "integerP", "floatP", "voidP", "new", "delay",
    "timeout", "preloadNetThing", "postNetText", "netDone", "netTextResult", "netError",
    "getStreamStatus", "go", "play", "stop", "pause", "puppetTempo", "updateStage", "preload",
    "frame", "marker", "label", "cursor", "member", "script", "sprite", "castLib",
    "puppetSprite",
];

pub fn call_builtin(player: &mut Player, name: &str, args: &[DatumRef]) -> BuiltinResult {
    match name.to_ascii_lowercase().as_str() {
        // math
        "abs" => math::abs(player, args),
        "sqrt" => math::sqrt(player, args),
        "sin" => math::sin(player, args),
        "cos" => math::cos(player, args),
        "tan" => math::tan(player, args),
        "atan" => math::atan(player, args),
        "exp" => math::exp(player, args),
        "log" => math::log(player, args),
        "power" => math::power(player, args),
        "random" => math::random(player, args),
        "pi" => math::pi(player, args),
        "max" => math::max(player, args),
        "min" => math::min(player, args),

        // type coercion and predicates
        "integer" => types::integer(player, args),
        "float" => types::float(player, args),
        "string" => types::string(player, args),
        "symbol" => types::symbol(player, args),
        "value" => types::value(player, args),
        "ilk" => types::ilk(player, args),
        "objectp" => types::object_p(player, args),
        "listp" => types::list_p(player, args),
        "stringp" => types::string_p(player, args),
        "symbolp" => types::symbol_p(player, args),
        "integerp" => types::integer_p(player, args),
        "floatp" => types::float_p(player, args),
        "voidp" => types::void_p(player, args),

        // strings
        "length" => string::length(player, args),
        "chars" => string::chars(player, args),
        "char" => string::char_chunk(player, args),
        "word" => string::word_chunk(player, args),
        "item" => string::item_chunk(player, args),
        "line" => string::line_chunk(player, args),
        "count" => string::count(player, args),
        "offset" => string::offset(player, args),
        "chartonum" => string::char_to_num(player, args),
        "numtochar" => string::num_to_char(player, args),
        "space" => string::space(player, args),

        // lists and property lists
        "list" => list::list(player, args),
        "getat" => list::get_at(player, args),
        "setat" => list::set_at(player, args),
        "add" => list::add(player, args),
        "addat" => list::add_at(player, args),
        "append" => list::append(player, args),
        "deleteat" => list::delete_at(player, args),
        "deleteone" => list::delete_one(player, args),
        "deleteall" => list::delete_all(player, args),
        "getone" => list::get_one(player, args),
        "getpos" => list::get_pos(player, args),
        "sort" => list::sort(player, args),
        "duplicate" => list::duplicate(player, args),
        "getlast" => list::get_last(player, args),
        "deletelast" => list::delete_last(player, args),
        "getprop" => list::get_prop(player, args),
        "setprop" => list::set_prop(player, args),
        "addprop" => list::add_prop(player, args),
        "deleteprop" => list::delete_prop(player, args),
        "findpos" => list::find_pos(player, args),
        "findposnear" => list::find_pos_near(player, args),
        "getpropat" => list::get_prop_at(player, args),
        "getaprop" => list::get_a_prop(player, args),
        "setaprop" => list::set_a_prop(player, args),

        // geometry
        "point" => geometry::point(player, args),
        "rect" => geometry::rect(player, args),
        "union" => geometry::union(player, args),
        "intersect" => geometry::intersect(player, args),
        "inside" => geometry::inside(player, args),
        "map" => geometry::map(player, args),

        // sound
        "sound" => sound::sound(player, args),
        "puppetsound" => sound::puppet_sound(player, args),
        "playsound" => sound::play_sound(player, args),
        "stopsound" => sound::stop_sound(player, args),
        "soundbusy" => sound::sound_busy(player, args),
        "soundlevel" => sound::sound_level(player, args),
        "beep" => sound::beep(player, args),

        // net
        "preloadnetthing" => net::preload_net_thing(player, args),
        "postnettext" => net::post_net_text(player, args),
        "netdone" => net::net_done(player, args),
        "nettextresult" => net::net_text_result(player, args),
        "neterror" => net::net_error(player, args),
        "getstreamstatus" => net::get_stream_status(player, args),
        "preload" => net::preload(player, args),

        // movie and player control
        "go" => movie::go(player, args),
        "play" => movie::play(player, args),
        "stop" => movie::stop(player, args),
        "pause" => movie::pause(player, args),
        "halt" => movie::halt(player, args),
        "delay" => movie::delay(player, args),
        "puppettempo" => movie::puppet_tempo(player, args),
        "puppetsprite" => movie::puppet_sprite(player, args),
        "updatestage" => movie::update_stage(player, args),
        "frame" => movie::frame(player, args),
        "marker" | "label" => movie::label(player, args),
        "put" => movie::put(player, args),
        "alert" => movie::alert(player, args),
        "nothing" => movie::nothing(player, args),
        "pass" => movie::pass(player, args),
        "cursor" => movie::cursor(player, args),
        "member" => movie::member(player, args),
        "script" => movie::script(player, args),
        "sprite" => movie::sprite(player, args),
        "castlib" => movie::cast_lib(player, args),
        "new" => movie::new(player, args),
        "timeout" => movie::timeout(player, args),

        _ => Err(ScriptError::UndefinedHandler(name.to_string())),
    }
}
