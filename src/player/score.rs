use itertools::Itertools;

use crate::director::chunks::score::{FrameLabel, FrameSpriteData};
use crate::director::file::MovieFile;

use super::cast_lib::CastMemberRef;
use super::script::InstanceId;
use super::sprite::Sprite;

pub struct SpriteChannel {
    pub number: usize,
    pub sprite: Sprite,
}

impl SpriteChannel {
    pub fn new(number: usize) -> SpriteChannel {
        SpriteChannel {
            number,
            sprite: Sprite::new(number),
        }
    }
}

/// A contiguous run of frames in one channel, with the behavior the score
/// attaches to it. Channel 0 spans carry the frame script.
#[derive(Clone)]
pub struct SpriteSpan {
    pub channel: u32,
    pub start_frame: u32,
    pub end_frame: u32,
    pub behavior: Option<CastMemberRef>,
}

/// The runtime view of the score: channel table, span index and frame
/// labels.
pub struct Score {
    pub channels: Vec<SpriteChannel>,
    pub sprite_spans: Vec<SpriteSpan>,
    pub frame_script_spans: Vec<SpriteSpan>,
    pub frame_labels: Vec<FrameLabel>,
    pub frame_count: u32,
    /// Frame-major per-channel sprite data from the score chunk.
    pub frame_sprites: Vec<Vec<FrameSpriteData>>,
}

impl Score {
    pub fn empty() -> Score {
        Score {
            channels: Vec::new(),
            sprite_spans: Vec::new(),
            frame_script_spans: Vec::new(),
            frame_labels: Vec::new(),
            frame_count: 0,
            frame_sprites: Vec::new(),
        }
    }

    pub fn load_from_movie(&mut self, file: &MovieFile) {
        self.sprite_spans.clear();
        self.frame_script_spans.clear();

        if let Some(score_chunk) = &file.score {
            self.set_channel_count(score_chunk.frame_data.header.num_channels as usize);
            self.frame_count = score_chunk.frame_data.header.frame_count;
            self.frame_sprites = score_chunk.frame_data.channel_sprites.clone();

            for (i, primary) in score_chunk.frame_interval_primaries.iter().enumerate() {
                let behavior = score_chunk
                    .frame_interval_secondaries
                    .get(i)
                    .filter(|s| s.cast_member != 0)
                    .map(|s| CastMemberRef::new(s.cast_lib, s.cast_member));
                let span = SpriteSpan {
                    channel: primary.channel,
                    start_frame: primary.start_frame,
                    end_frame: primary.end_frame,
                    behavior,
                };
                if span.channel == 0 {
                    self.frame_script_spans.push(span);
                } else {
                    self.sprite_spans.push(span);
                }
            }
            self.sprite_spans
                .sort_by_key(|span| (span.channel, span.start_frame));
        }

        if let Some(labels) = &file.frame_labels {
            self.frame_labels = labels.labels.clone();
        }
    }

    pub fn set_channel_count(&mut self, new_count: usize) {
        while self.channels.len() < new_count {
            let number = self.channels.len() + 1;
            self.channels.push(SpriteChannel::new(number));
        }
        self.channels.truncate(new_count);
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// 1-based channel access, the way scripts address sprites.
    pub fn get_sprite(&self, number: i32) -> Option<&Sprite> {
        if number <= 0 || number as usize > self.channels.len() {
            return None;
        }
        self.channels.get(number as usize - 1).map(|c| &c.sprite)
    }

    pub fn get_sprite_mut(&mut self, number: i32) -> Option<&mut Sprite> {
        if number <= 0 || number as usize > self.channels.len() {
            return None;
        }
        self.channels
            .get_mut(number as usize - 1)
            .map(|c| &mut c.sprite)
    }

    /// The frame script span covering `frame`, if any.
    pub fn get_script_in_frame(&self, frame: u32) -> Option<&SpriteSpan> {
        self.frame_script_spans
            .iter()
            .find(|span| frame >= span.start_frame && frame <= span.end_frame)
    }

    /// Sprite spans active at `frame`, ascending channel order.
    pub fn spans_at_frame(&self, frame: u32) -> Vec<&SpriteSpan> {
        self.sprite_spans
            .iter()
            .filter(|span| frame >= span.start_frame && frame <= span.end_frame)
            .sorted_by_key(|span| span.channel)
            .collect()
    }

    /// Resolves a frame label to its frame number.
    pub fn frame_for_label(&self, label: &str) -> Option<u32> {
        self.frame_labels
            .iter()
            .find(|l| l.label.eq_ignore_ascii_case(label))
            .map(|l| l.frame_num.max(1) as u32)
    }

    /// The label in effect at `frame` (the nearest label at or before it).
    pub fn label_at_frame(&self, frame: u32) -> Option<&str> {
        self.frame_labels
            .iter()
            .filter(|l| l.frame_num <= frame as i32)
            .max_by_key(|l| l.frame_num)
            .map(|l| l.label.as_str())
    }

    pub fn last_frame(&self) -> u32 {
        let span_max = self
            .sprite_spans
            .iter()
            .chain(self.frame_script_spans.iter())
            .map(|s| s.end_frame)
            .max()
            .unwrap_or(0);
        self.frame_count.max(span_max).max(1)
    }

    /// Every behavior instance attached to any sprite, channel order.
    pub fn active_instance_list(&self) -> Vec<InstanceId> {
        self.channels
            .iter()
            .flat_map(|c| c.sprite.script_instance_list.iter().copied())
            .collect()
    }

    /// Copies the score's recorded sprite state for `frame` into the
    /// channels, skipping puppeted sprites.
    pub fn apply_frame(&mut self, frame: u32) {
        let row = match self.frame_sprites.get((frame as usize).saturating_sub(1)) {
            Some(row) => row.clone(),
            None => return,
        };
        for (i, data) in row.iter().enumerate() {
            let Some(channel) = self.channels.get_mut(i) else {
                continue;
            };
            if channel.sprite.puppet {
                continue;
            }
            if data.is_empty() {
                channel.sprite.member = None;
                continue;
            }
            channel.sprite.member = Some(CastMemberRef::new(
                data.cast_lib.max(1),
                data.cast_member,
            ));
            channel.sprite.loc_h = data.pos_x as i32;
            channel.sprite.loc_v = data.pos_y as i32;
            channel.sprite.width = data.width as i32;
            channel.sprite.height = data.height as i32;
        }
    }

    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.sprite.reset();
        }
    }
}
