use crate::director::file::MovieFile;
use crate::director::lingo::datum::{datum_bool, Datum};

use super::cast_manager::CastManager;
use super::score::Score;
use super::ScriptError;

/// Movie-level state: the mounted casts, the score cursor and the
/// handful of knobs scripts reach through `the ...` movie properties.
pub struct Movie {
    pub rect: (i32, i32, i32, i32),
    pub cast_manager: CastManager,
    pub score: Score,
    pub current_frame: u32,
    pub frame_rate: u16,
    pub puppet_tempo: u32,
    pub dir_version: u16,
    pub item_delimiter: char,
    pub exit_lock: bool,
    pub update_lock: bool,
    pub stage_color: (u8, u8, u8),
    pub base_path: String,
    pub file_name: String,
}

impl Movie {
    pub fn empty() -> Movie {
        Movie {
            rect: (0, 0, 0, 0),
            cast_manager: CastManager::empty(),
            score: Score::empty(),
            current_frame: 1,
            frame_rate: 30,
            puppet_tempo: 0,
            dir_version: 0,
            item_delimiter: ',',
            exit_lock: false,
            update_lock: false,
            stage_color: (0, 0, 0),
            base_path: String::new(),
            file_name: String::new(),
        }
    }

    pub fn load_from_file(&mut self, mut file: MovieFile) {
        let config = &file.config;
        self.rect = (
            config.movie_left as i32,
            config.movie_top as i32,
            config.movie_right as i32,
            config.movie_bottom as i32,
        );
        self.frame_rate = config.frame_rate;
        self.dir_version = file.version;
        self.stage_color = config.stage_color();
        self.base_path = file.base_path.clone();
        self.file_name = file.file_name.clone();
        self.current_frame = 1;

        self.cast_manager.load_from_movie(&mut file);
        self.score.load_from_movie(&file);
    }

    pub fn stage_width(&self) -> i32 {
        self.rect.2 - self.rect.0
    }

    pub fn stage_height(&self) -> i32 {
        self.rect.3 - self.rect.1
    }

    pub fn get_prop(&self, prop: &str) -> Result<Datum, ScriptError> {
        match prop {
            "frame" => Ok(Datum::Int(self.current_frame as i32)),
            "lastFrame" => Ok(Datum::Int(self.score.last_frame() as i32)),
            "frameTempo" | "puppetTempo" => Ok(Datum::Int(self.puppet_tempo as i32)),
            "frameRate" => Ok(Datum::Int(self.frame_rate as i32)),
            "frameLabel" => Ok(self
                .score
                .label_at_frame(self.current_frame)
                .map(|l| Datum::String(l.to_string()))
                .unwrap_or(Datum::Int(0))),
            "stageWidth" => Ok(Datum::Int(self.stage_width())),
            "stageHeight" => Ok(Datum::Int(self.stage_height())),
            "rect" => Ok(Datum::IntRect(self.rect)),
            "itemDelimiter" => Ok(Datum::String(self.item_delimiter.to_string())),
            "exitLock" => Ok(datum_bool(self.exit_lock)),
            "updateLock" => Ok(datum_bool(self.update_lock)),
            "moviePath" | "pathName" => Ok(Datum::String(self.base_path.clone())),
            "movieName" => Ok(Datum::String(self.file_name.clone())),
            "movie" => Ok(Datum::String(self.file_name.clone())),
            "numberOfCastLibs" => Ok(Datum::Int(self.cast_manager.casts.len() as i32)),
            "stageColor" => {
                let (r, g, b) = self.stage_color;
                Ok(Datum::Color(r, g, b))
            }
            "dirVersion" | "fileVersion" => Ok(Datum::Int(self.dir_version as i32)),
            _ => Err(ScriptError::TypeMismatch(format!(
                "unknown movie property {prop}"
            ))),
        }
    }

    pub fn set_prop(&mut self, prop: &str, value: &Datum) -> Result<(), ScriptError> {
        match prop {
            "itemDelimiter" => {
                let s = value.string_value()?;
                self.item_delimiter = s.chars().next().unwrap_or(',');
                Ok(())
            }
            "exitLock" => {
                self.exit_lock = value.bool_value();
                Ok(())
            }
            "updateLock" => {
                self.update_lock = value.bool_value();
                Ok(())
            }
            "puppetTempo" => {
                self.puppet_tempo = value.int_value()?.max(0) as u32;
                Ok(())
            }
            "stageColor" => {
                match value {
                    Datum::Color(r, g, b) => self.stage_color = (*r, *g, *b),
                    other => {
                        let index = other.int_value()? as u8;
                        self.stage_color = (index, index, index);
                    }
                }
                Ok(())
            }
            _ => Err(ScriptError::TypeMismatch(format!(
                "cannot set movie property {prop}"
            ))),
        }
    }
}
