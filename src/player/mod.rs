pub mod allocator;
pub mod behavior;
pub mod bitmap;
pub mod bytecode;
pub mod cast_lib;
pub mod cast_manager;
pub mod cast_member;
pub mod compare;
pub mod context_vars;
pub mod datum_formatting;
pub mod datum_operations;
pub mod debug;
pub mod events;
pub mod geometry;
pub mod handlers;
pub mod movie;
pub mod net_manager;
pub mod net_task;
pub mod scope;
pub mod score;
pub mod script;
pub mod sprite;
pub mod string_chunk;
pub mod timeout;

use std::rc::Rc;
use std::time::Instant;

use fxhash::FxHashMap;
use log::{debug, error, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use thiserror::Error;
use url::Url;

use crate::director::file::{read_movie_file_bytes, MovieFile};
use crate::director::lingo::datum::{Datum, ListKind};
use crate::io::DecodeError;

use self::allocator::{DatumAllocator, DatumRef, VOID_DATUM_REF};
use self::behavior::BehaviorManager;
use self::bytecode::handler_manager::call_handler_scope;
use self::cast_lib::CastMemberRef;
use self::debug::BreakpointManager;
use self::movie::Movie;
use self::net_manager::NetManager;
use self::net_task::{ResourceKind, TaskId};
use self::scope::{Scope, ScopeResult};
use self::script::{InstanceId, Script, ScriptInstance, MAX_ANCESTOR_DEPTH};
use self::timeout::TimeoutManager;

pub const MAX_SCOPE_DEPTH: usize = 50;
pub const MAX_EVAL_STACK_DEPTH: usize = 4096;
pub const DEFAULT_STEP_BUDGET: u32 = 1_000_000;
pub const MAX_FRAME_NAVIGATION_DEPTH: u32 = 100;

/// Script-level failures. Caught at the dispatcher boundary: logged,
/// the handler counts as consumed, playback continues.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("branch to byte offset {0} matches no instruction")]
    BadBranchTarget(usize),
    #[error("step budget of {0} exhausted")]
    StepLimit(u32),
    #[error("division by zero")]
    DivideByZero,
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("no handler named \"{0}\"")]
    UndefinedHandler(String),
    #[error("evaluation stack underflow")]
    StackUnderflow,
    #[error("evaluation stack depth exceeded")]
    StackOverflow,
    #[error("call depth limit reached")]
    CallDepthExceeded,
    #[error("bad receiver: {0}")]
    BadReceiver(String),
    #[error(transparent)]
    Runtime(#[from] PlayerError),
}

/// Player-level failures, surfaced to the embedding host.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("frame navigation deeper than {0} levels")]
    MaxFrameNavigationDepth(u32),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("movie load failed: {0}")]
    Load(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Paused,
    Playing,
}

pub struct SoundChannelState {
    pub member: Option<CastMemberRef>,
    pub playing: bool,
    pub volume: u8,
}

impl SoundChannelState {
    fn new() -> SoundChannelState {
        SoundChannelState {
            member: None,
            playing: false,
            volume: 255,
        }
    }
}

const SOUND_CHANNEL_COUNT: usize = 8;

/// The playback core: movie state, the Lingo VM and the loader, driven
/// by `tick` from the embedding host. Everything lives on one thread;
/// only the loader's task table is shared with its workers.
pub struct Player {
    pub movie: Movie,
    pub net_manager: NetManager,
    pub allocator: DatumAllocator,
    pub globals: FxHashMap<String, DatumRef>,
    pub scopes: Vec<Scope>,
    pub behavior_manager: BehaviorManager,
    pub breakpoint_manager: BreakpointManager,
    pub timeout_manager: TimeoutManager,
    pub state: PlayerState,
    pub cursor: i32,
    pub sound_channels: Vec<SoundChannelState>,
    pub sound_level: u8,
    pub delay_ticks: u32,
    pub last_handler_result: DatumRef,
    pub step_budget: u32,
    pub steps_remaining: u32,
    pub stop_requested: bool,
    pub rng: SmallRng,
    start_time: Instant,
    /// Navigation requested during dispatch; applied when the outermost
    /// dispatch unwinds.
    queued_frame: Option<u32>,
    dispatch_depth: u32,
    nav_depth: u32,
    script_static_props: FxHashMap<CastMemberRef, Vec<(String, DatumRef)>>,
    pending_cast_loads: Vec<(u32, TaskId)>,
}


impl Player {
    pub fn new() -> Player {
        let mut player = Player {
            movie: Movie::empty(),
            net_manager: NetManager::new(),
            allocator: DatumAllocator::new(),
            globals: FxHashMap::default(),
            scopes: Vec::new(),
            behavior_manager: BehaviorManager::new(),
            breakpoint_manager: BreakpointManager::new(),
            timeout_manager: TimeoutManager::new(),
            state: PlayerState::Stopped,
            cursor: 0,
            sound_channels: (0..SOUND_CHANNEL_COUNT)
                .map(|_| SoundChannelState::new())
                .collect(),
            sound_level: 7,
            delay_ticks: 0,
            last_handler_result: VOID_DATUM_REF,
            step_budget: DEFAULT_STEP_BUDGET,
            steps_remaining: DEFAULT_STEP_BUDGET,
            stop_requested: false,
            rng: SmallRng::seed_from_u64(0x1A2B3C4D),
            start_time: Instant::now(),
            queued_frame: None,
            dispatch_depth: 0,
            nav_depth: 0,
            script_static_props: FxHashMap::default(),
            pending_cast_loads: Vec::new(),
        };
        let actor_list = player.alloc_datum(Datum::List(ListKind::List, Vec::new(), false));
        player.globals.insert("actorList".to_string(), actor_list);
        player
    }

    // ---- datum heap ------------------------------------------------

    pub fn alloc_datum(&mut self, datum: Datum) -> DatumRef {
        self.allocator.alloc_datum(datum)
    }

    pub fn get_datum(&self, datum_ref: &DatumRef) -> &Datum {
        self.allocator.get_datum(datum_ref)
    }

    pub fn get_datum_mut(&mut self, datum_ref: &DatumRef) -> &mut Datum {
        self.allocator.get_datum_mut(datum_ref)
    }

    /// Deep copy for `duplicate`: containers are copied recursively,
    /// scalars shared.
    pub fn duplicate_datum(&mut self, datum_ref: &DatumRef) -> DatumRef {
        let datum = self.get_datum(datum_ref).clone();
        match datum {
            Datum::List(kind, items, sorted) => {
                let copies: Vec<DatumRef> =
                    items.iter().map(|item| self.duplicate_datum(item)).collect();
                self.alloc_datum(Datum::List(kind, copies, sorted))
            }
            Datum::PropList(entries, sorted) => {
                let copies: Vec<(DatumRef, DatumRef)> = entries
                    .iter()
                    .map(|(k, v)| (self.duplicate_datum(k), self.duplicate_datum(v)))
                    .collect();
                self.alloc_datum(Datum::PropList(copies, sorted))
            }
            other => self.alloc_datum(other),
        }
    }

    // ---- scope stack -----------------------------------------------

    pub fn current_scope_mut(&mut self) -> Result<&mut Scope, ScriptError> {
        self.scopes.last_mut().ok_or(ScriptError::StackUnderflow)
    }

    pub fn pop_stack(&mut self) -> Result<DatumRef, ScriptError> {
        self.current_scope_mut()?
            .stack
            .pop()
            .ok_or(ScriptError::StackUnderflow)
    }

    pub fn push_stack(&mut self, datum_ref: DatumRef) -> Result<(), ScriptError> {
        let scope = self.current_scope_mut()?;
        if scope.stack.len() >= MAX_EVAL_STACK_DEPTH {
            return Err(ScriptError::StackOverflow);
        }
        scope.stack.push(datum_ref);
        Ok(())
    }

    // ---- loading ---------------------------------------------------

    pub fn load_movie_from_file(&mut self, path: &str) -> Result<(), PlayerError> {
        let task_id = self.net_manager.preload(path, ResourceKind::Movie);
        self.net_manager.wait_for_task(task_id);
        let bytes = self
            .net_manager
            .result_bytes(Some(task_id))
            .ok_or_else(|| PlayerError::Load(format!("could not fetch {path}")))?;
        let (file_name, base_path) = split_movie_path(path);
        let file = read_movie_file_bytes(&bytes, &file_name, &base_path)?;
        self.load_movie(file);
        Ok(())
    }

    /// Installs a parsed movie and reports `prepareMovie` to its movie
    /// scripts. The player ends up `Stopped` at frame 1.
    pub fn load_movie(&mut self, file: MovieFile) {
        self.state = PlayerState::Stopped;
        self.movie.load_from_file(file);
        if let Ok(base) = Url::parse(&format!("file://{}/", self.movie.base_path.trim_end_matches('/'))) {
            self.net_manager.set_base_path(base);
        }
        self.start_external_cast_loads();
        events::dispatch_global_event(self, "prepareMovie", &[]);
    }

    fn start_external_cast_loads(&mut self) {
        let pending: Vec<(u32, String)> = self
            .movie
            .cast_manager
            .casts
            .iter()
            .filter(|cast| !cast.is_loaded && !cast.file_path.is_empty())
            .map(|cast| (cast.number, cast.file_path.clone()))
            .collect();
        for (number, path) in pending {
            let task_id = self.net_manager.preload(&path, ResourceKind::Cast);
            self.pending_cast_loads.push((number, task_id));
        }
    }

    /// Polls the loader and mounts any external casts that finished.
    fn poll_cast_loads(&mut self) {
        let mut finished = Vec::new();
        let mut pending = std::mem::take(&mut self.pending_cast_loads);
        pending.retain(|&(number, task_id)| {
            if self.net_manager.is_done(Some(task_id)) {
                finished.push((number, task_id));
                false
            } else {
                true
            }
        });
        self.pending_cast_loads = pending;
        for (number, task_id) in finished {
            match self.net_manager.result_bytes(Some(task_id)) {
                Some(bytes) => {
                    match read_movie_file_bytes(&bytes, "", &self.movie.base_path) {
                        Ok(mut file) => {
                            self.movie.cast_manager.attach_external_cast(number, &mut file);
                            debug!("mounted external cast {number}");
                        }
                        Err(err) => warn!("external cast {number} failed to parse: {err}"),
                    }
                }
                None => warn!(
                    "external cast {number} failed to load: error {}",
                    self.net_manager.error_code(Some(task_id)).unwrap_or(0)
                ),
            }
        }
    }

    // ---- playback state machine ------------------------------------

    pub fn play(&mut self) {
        if self.state == PlayerState::Playing {
            return;
        }
        if self.state == PlayerState::Paused {
            self.state = PlayerState::Playing;
            return;
        }
        self.nav_depth = 0;
        self.stop_requested = false;
        events::dispatch_global_event(self, "prepareMovie", &[]);
        self.load_frame_state(self.movie.current_frame);
        events::dispatch_global_event(self, "startMovie", &[]);
        self.state = PlayerState::Playing;
        if self.stop_requested {
            self.stop();
        }
    }

    pub fn stop(&mut self) {
        if self.state == PlayerState::Stopped {
            return;
        }
        self.stop_requested = false;
        events::dispatch_global_event(self, "stopMovie", &[]);
        self.state = PlayerState::Stopped;
        self.movie.current_frame = 1;
        self.behavior_manager.clear();
        self.timeout_manager.clear();
        self.queued_frame = None;
    }

    pub fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.state = PlayerState::Paused;
        }
    }

    /// One frame of playback. The host calls this at the movie's tempo.
    pub fn tick(&mut self) {
        if self.state != PlayerState::Playing {
            return;
        }
        if self.delay_ticks > 0 {
            self.delay_ticks -= 1;
            return;
        }
        self.nav_depth = 0;

        let frame_before = self.movie.current_frame;
        events::dispatch_global_event(self, "exitFrame", &[]);
        if self.state != PlayerState::Playing {
            return;
        }

        // A handler may have navigated; only auto-advance if not.
        if self.movie.current_frame == frame_before {
            let last = self.movie.score.last_frame();
            let next = if frame_before + 1 > last { 1 } else { frame_before + 1 };
            self.movie.current_frame = next;
        }

        let frame = self.movie.current_frame;
        self.load_frame_state(frame);
        events::dispatch_global_event(self, "prepareFrame", &[]);
        events::dispatch_global_event(self, "enterFrame", &[]);
        // The idle slot is where scripts poll the loader.
        events::dispatch_global_event(self, "idle", &[]);

        self.advance_timeouts();
        self.poll_cast_loads();

        if self.stop_requested {
            self.stop();
        }
    }

    pub fn frame_rate(&self) -> u32 {
        if self.movie.puppet_tempo > 0 {
            self.movie.puppet_tempo
        } else {
            self.movie.frame_rate.max(1) as u32
        }
    }

    fn advance_timeouts(&mut self) {
        if self.timeout_manager.is_empty() {
            return;
        }
        let delta_ms = 1000 / self.frame_rate().max(1);
        let due = self.timeout_manager.advance(delta_ms);
        for (handler, target, timeout_name) in due {
            let timeout_ref = self.alloc_datum(Datum::TimeoutRef(timeout_name));
            match target {
                Some(instance_id) => {
                    events::dispatch_event_to_instances(
                        self,
                        &[instance_id],
                        &handler,
                        &[timeout_ref],
                    );
                }
                None => {
                    events::dispatch_global_event(self, &handler, &[timeout_ref]);
                }
            }
        }
    }

    pub fn elapsed_milliseconds(&self) -> i32 {
        self.start_time.elapsed().as_millis() as i32
    }

    // ---- frame state -----------------------------------------------

    /// Loads sprite states from the score and binds span behaviors for
    /// `frame`.
    fn load_frame_state(&mut self, frame: u32) {
        self.movie.score.apply_frame(frame);
        if self.behavior_manager.frame != frame {
            self.bind_frame_behaviors(frame);
        }
    }

    /// Instantiates every behavior attached to a span active at `frame`.
    /// Scripts with a `new` handler run it; the rest get a default
    /// instance with declared properties set void.
    fn bind_frame_behaviors(&mut self, frame: u32) {
        for channel in &mut self.movie.score.channels {
            channel.sprite.script_instance_list.clear();
        }
        self.behavior_manager.clear();
        self.behavior_manager.frame = frame;

        let refs = BehaviorManager::refs_for_frame(&self.movie.score, frame);
        for behavior_ref in refs {
            let instance = match self.instantiate_behavior(&behavior_ref.script, behavior_ref.channel) {
                Ok(instance) => instance,
                Err(err) => {
                    warn!(
                        "behavior {:?} on channel {} failed to instantiate: {err}",
                        behavior_ref.script, behavior_ref.channel
                    );
                    continue;
                }
            };
            if behavior_ref.channel == 0 {
                self.behavior_manager.frame_behaviors.push(instance);
            } else {
                self.behavior_manager
                    .bind_sprite(behavior_ref.channel, vec![instance]);
                if let Some(sprite) = self.movie.score.get_sprite_mut(behavior_ref.channel as i32) {
                    sprite.script_instance_list.push(instance);
                }
            }
        }
    }

    fn instantiate_behavior(
        &mut self,
        script_ref: &CastMemberRef,
        channel: u32,
    ) -> Result<InstanceId, ScriptError> {
        let script = self
            .movie
            .cast_manager
            .get_script_by_ref(script_ref)
            .cloned()
            .ok_or_else(|| {
                ScriptError::BadReceiver(format!("no script for member {script_ref:?}"))
            })?;
        let instance_id = self.create_default_instance(&script)?;
        let sprite_num = self.alloc_datum(Datum::Int(channel as i32));
        if let Some(instance) = self.allocator.get_instance_mut(instance_id) {
            instance.add_prop("spriteNum".to_string(), sprite_num);
        }
        if script.has_handler("new") {
            self.call_handler_on_script(script, "new", Some(instance_id), Vec::new())?;
        }
        Ok(instance_id)
    }

    fn create_default_instance(&mut self, script: &Rc<Script>) -> Result<InstanceId, ScriptError> {
        let lctx = self
            .movie
            .cast_manager
            .get_cast(script.member_ref.cast_lib as u32)
            .ok()
            .and_then(|cast| cast.lctx.as_ref());
        let instance = match lctx {
            Some(lctx) => ScriptInstance::new(script.member_ref, script, lctx),
            None => ScriptInstance {
                instance_id: 0,
                script: script.member_ref,
                ancestor: None,
                properties: Vec::new(),
            },
        };
        Ok(self.allocator.alloc_instance(instance))
    }

    // ---- navigation ------------------------------------------------

    /// `go to frame`. Inside a dispatch the target is only recorded; it
    /// takes effect when the outermost dispatch returns.
    pub fn queue_navigation(&mut self, frame: u32) -> Result<(), ScriptError> {
        if self.dispatch_depth > 0 {
            self.queued_frame = Some(frame);
            Ok(())
        } else {
            self.goto_frame_immediate(frame).map_err(ScriptError::from)
        }
    }

    pub fn goto_frame_immediate(&mut self, frame: u32) -> Result<(), PlayerError> {
        if self.nav_depth >= MAX_FRAME_NAVIGATION_DEPTH {
            return Err(PlayerError::MaxFrameNavigationDepth(
                MAX_FRAME_NAVIGATION_DEPTH,
            ));
        }
        self.nav_depth += 1;
        self.movie.current_frame = frame;
        self.load_frame_state(frame);
        events::dispatch_global_event(self, "prepareFrame", &[]);
        events::dispatch_global_event(self, "enterFrame", &[]);
        Ok(())
    }

    pub(crate) fn enter_dispatch(&mut self) {
        if self.dispatch_depth == 0 {
            self.steps_remaining = self.step_budget;
        }
        self.dispatch_depth += 1;
    }

    pub(crate) fn exit_dispatch(&mut self) {
        self.dispatch_depth = self.dispatch_depth.saturating_sub(1);
        if self.dispatch_depth > 0 {
            return;
        }
        while let Some(frame) = self.queued_frame.take() {
            if frame == self.movie.current_frame {
                break;
            }
            if let Err(err) = self.goto_frame_immediate(frame) {
                warn!("deferred navigation failed: {err}");
                break;
            }
        }
    }

    // ---- calls -----------------------------------------------------

    /// Calls `handler_name` on `script`, binding `receiver` as `me` when
    /// present. The receiver (or the script itself for behaviors and
    /// parents) is prepended to the compiled handler's parameter list.
    pub fn call_handler_on_script(
        &mut self,
        script: Rc<Script>,
        handler_name: &str,
        receiver: Option<InstanceId>,
        mut args: Vec<DatumRef>,
    ) -> Result<ScopeResult, ScriptError> {
        let handler_index = script
            .handler_index_of(handler_name)
            .ok_or_else(|| ScriptError::UndefinedHandler(handler_name.to_string()))?;

        let receiver_arg = match receiver {
            Some(instance_id) => Some(Datum::ScriptInstance(instance_id)),
            None if script.script_type != crate::director::enums::ScriptType::Movie => {
                Some(Datum::ScriptRef(script.member_ref))
            }
            None => None,
        };
        if let Some(receiver_arg) = receiver_arg {
            let receiver_ref = self.alloc_datum(receiver_arg);
            args.insert(0, receiver_ref);
        }

        self.enter_dispatch();
        let result = call_handler_scope(self, script, handler_index, receiver, args);
        self.exit_dispatch();
        result
    }

    /// Raw-argument call used by `LocalCall`: the compiler has already
    /// included `me` in the argument list when it applies.
    pub fn call_script_handler_at(
        &mut self,
        script: Rc<Script>,
        handler_index: usize,
        receiver: Option<InstanceId>,
        args: Vec<DatumRef>,
    ) -> Result<ScopeResult, ScriptError> {
        call_handler_scope(self, script, handler_index, receiver, args)
    }

    /// Global call resolution: a receiver smuggled as the first
    /// argument, then active behavior instances, then the frame script
    /// and movie scripts, then the builtin library.
    pub fn call_global_handler(
        &mut self,
        name: &str,
        args: &[DatumRef],
    ) -> Result<DatumRef, ScriptError> {
        // `customHandler(obj, ...)` dispatches to obj when obj defines it.
        if !name.eq_ignore_ascii_case("new") {
            if let Some(first) = args.first() {
                if let Datum::ScriptInstance(instance_id) = self.get_datum(first) {
                    let instance_id = *instance_id;
                    if let Some((script, receiver)) =
                        self.resolve_instance_handler(instance_id, name)
                    {
                        let result = self.call_handler_on_script(
                            script,
                            name,
                            Some(receiver),
                            args[1..].to_vec(),
                        )?;
                        self.propagate_pass(&result);
                        return Ok(result.return_value);
                    }
                }
            }

            for instance_id in self.movie.score.active_instance_list() {
                if let Some((script, receiver)) = self.resolve_instance_handler(instance_id, name) {
                    let result =
                        self.call_handler_on_script(script, name, Some(receiver), args.to_vec())?;
                    self.propagate_pass(&result);
                    return Ok(result.return_value);
                }
            }

            let static_script = self.find_static_handler_script(name);
            if let Some(script) = static_script {
                let result = self.call_handler_on_script(script, name, None, args.to_vec())?;
                self.propagate_pass(&result);
                return Ok(result.return_value);
            }
        }

        if handlers::has_builtin(name) {
            return handlers::call_builtin(self, name, args);
        }
        Err(ScriptError::UndefinedHandler(name.to_string()))
    }

    fn propagate_pass(&mut self, result: &ScopeResult) {
        if result.passed {
            if let Some(scope) = self.scopes.last_mut() {
                scope.passed = true;
            }
        }
    }

    fn find_static_handler_script(&self, name: &str) -> Option<Rc<Script>> {
        if let Some(span) = self.movie.score.get_script_in_frame(self.movie.current_frame) {
            if let Some(script_ref) = span.behavior {
                if let Some(script) = self.movie.cast_manager.get_script_by_ref(&script_ref) {
                    if script.has_handler(name) {
                        return Some(script.clone());
                    }
                }
            }
        }
        self.movie
            .cast_manager
            .movie_scripts()
            .into_iter()
            .find(|script| script.has_handler(name))
    }

    /// Finds the script along `instance_id`'s ancestor chain defining
    /// `name`. The receiver stays the original instance.
    fn resolve_instance_handler(
        &self,
        instance_id: InstanceId,
        name: &str,
    ) -> Option<(Rc<Script>, InstanceId)> {
        let mut current = Some(instance_id);
        for _ in 0..MAX_ANCESTOR_DEPTH {
            let instance = self.allocator.get_instance(current?)?;
            let script = self.movie.cast_manager.get_script_by_ref(&instance.script);
            if let Some(script) = script {
                if script.has_handler(name) {
                    return Some((script.clone(), instance_id));
                }
            }
            current = instance.ancestor;
        }
        None
    }

    /// Method dispatch on a value: instances and script refs get
    /// handler calls, containers and references map onto the builtin
    /// library with the receiver as first argument.
    pub fn call_datum_handler(
        &mut self,
        obj_ref: &DatumRef,
        name: &str,
        args: &[DatumRef],
    ) -> Result<DatumRef, ScriptError> {
        let obj = self.get_datum(obj_ref).clone();
        match obj {
            Datum::ScriptInstance(instance_id) => {
                if let Some((script, receiver)) = self.resolve_instance_handler(instance_id, name) {
                    let result =
                        self.call_handler_on_script(script, name, Some(receiver), args.to_vec())?;
                    self.propagate_pass(&result);
                    Ok(result.return_value)
                } else {
                    Err(ScriptError::UndefinedHandler(format!(
                        "{name} on instance {instance_id}"
                    )))
                }
            }
            Datum::ScriptRef(member_ref) => {
                if name.eq_ignore_ascii_case("new") {
                    return self.new_script_instance(member_ref, args);
                }
                let script = self
                    .movie
                    .cast_manager
                    .get_script_by_ref(&member_ref)
                    .cloned()
                    .ok_or_else(|| {
                        ScriptError::BadReceiver(format!("no script for member {member_ref:?}"))
                    })?;
                let result = self.call_handler_on_script(script, name, None, args.to_vec())?;
                Ok(result.return_value)
            }
            Datum::TimeoutRef(timeout_name) => {
                self.call_timeout_handler(&timeout_name, name, args)
            }
            Datum::SoundChannel(channel) => self.call_sound_channel_handler(channel, name, args),
            Datum::StringChunk(source, expr, _) => match name.to_ascii_lowercase().as_str() {
                "setcontents" => {
                    let text = self
                        .get_datum(args.first().unwrap_or(&VOID_DATUM_REF))
                        .string_value()?;
                    bytecode::string::write_chunk_source(self, &source, &expr, text)?;
                    Ok(VOID_DATUM_REF)
                }
                "delete" => {
                    bytecode::string::write_chunk_source(self, &source, &expr, String::new())?;
                    Ok(VOID_DATUM_REF)
                }
                _ => {
                    let mut builtin_args = Vec::with_capacity(args.len() + 1);
                    builtin_args.push(*obj_ref);
                    builtin_args.extend_from_slice(args);
                    if handlers::has_builtin(name) {
                        handlers::call_builtin(self, name, &builtin_args)
                    } else {
                        Err(ScriptError::UndefinedHandler(name.to_string()))
                    }
                }
            },
            _ => {
                // getAt(list, ...) and list.getAt(...) are the same
                // operation; reuse the builtin with obj prepended.
                let mut builtin_args = Vec::with_capacity(args.len() + 1);
                builtin_args.push(*obj_ref);
                builtin_args.extend_from_slice(args);
                if handlers::has_builtin(name) {
                    handlers::call_builtin(self, name, &builtin_args)
                } else {
                    Err(ScriptError::UndefinedHandler(name.to_string()))
                }
            }
        }
    }

    fn call_timeout_handler(
        &mut self,
        timeout_name: &str,
        method: &str,
        args: &[DatumRef],
    ) -> Result<DatumRef, ScriptError> {
        match method.to_ascii_lowercase().as_str() {
            "new" => {
                let period = self
                    .get_datum(args.first().unwrap_or(&VOID_DATUM_REF))
                    .int_value()?;
                let handler = match args.get(1).map(|r| self.get_datum(r)) {
                    Some(Datum::Symbol(s)) => s.clone(),
                    Some(other) => other.string_value()?,
                    None => {
                        return Err(ScriptError::TypeMismatch(
                            "timeout new needs a handler".to_string(),
                        ))
                    }
                };
                let target = match args.get(2).map(|r| self.get_datum(r)) {
                    Some(Datum::ScriptInstance(id)) => Some(*id),
                    _ => None,
                };
                self.timeout_manager.schedule(
                    timeout_name.to_string(),
                    period.max(0) as u32,
                    handler,
                    target,
                );
                Ok(self.alloc_datum(Datum::TimeoutRef(timeout_name.to_string())))
            }
            "forget" => {
                self.timeout_manager.forget(timeout_name);
                Ok(VOID_DATUM_REF)
            }
            other => Err(ScriptError::UndefinedHandler(format!(
                "{other} on timeout"
            ))),
        }
    }

    fn call_sound_channel_handler(
        &mut self,
        channel: u8,
        method: &str,
        args: &[DatumRef],
    ) -> Result<DatumRef, ScriptError> {
        match method.to_ascii_lowercase().as_str() {
            "play" | "queue" => {
                let member = match args.first().map(|r| self.get_datum(r)) {
                    Some(Datum::CastMember(member_ref)) => Some(*member_ref),
                    _ => None,
                };
                self.sound_play(channel as i32, member);
                Ok(VOID_DATUM_REF)
            }
            "stop" | "pause" => {
                self.sound_stop(channel as i32);
                Ok(VOID_DATUM_REF)
            }
            other => Err(ScriptError::UndefinedHandler(format!(
                "{other} on sound channel"
            ))),
        }
    }

    // ---- instances -------------------------------------------------

    pub fn new_script_instance_by_name(
        &mut self,
        script_name: &str,
        args: &[DatumRef],
    ) -> Result<DatumRef, ScriptError> {
        let member_ref = self
            .movie
            .cast_manager
            .find_member_ref_by_name(script_name)
            .ok_or_else(|| {
                ScriptError::BadReceiver(format!("no script member named \"{script_name}\""))
            })?;
        self.new_script_instance(member_ref, args)
    }

    /// `new(script ...)`: builds the instance, runs the script's `new`
    /// handler when it has one, and yields whatever that handler
    /// returns (the instance itself otherwise).
    pub fn new_script_instance(
        &mut self,
        member_ref: CastMemberRef,
        args: &[DatumRef],
    ) -> Result<DatumRef, ScriptError> {
        let script = self
            .movie
            .cast_manager
            .get_script_by_ref(&member_ref)
            .cloned()
            .ok_or_else(|| {
                ScriptError::BadReceiver(format!("member {member_ref:?} is not a script"))
            })?;
        let instance_id = self.create_default_instance(&script)?;
        if script.has_handler("new") {
            let result =
                self.call_handler_on_script(script, "new", Some(instance_id), args.to_vec())?;
            if !result.return_value.is_void() {
                return Ok(result.return_value);
            }
        }
        Ok(self.alloc_datum(Datum::ScriptInstance(instance_id)))
    }

    // ---- script static properties ----------------------------------

    pub fn script_static_prop(&self, member_ref: &CastMemberRef, name: &str) -> DatumRef {
        self.script_static_props
            .get(member_ref)
            .and_then(|props| {
                props
                    .iter()
                    .find(|(prop, _)| prop.eq_ignore_ascii_case(name))
                    .map(|(_, value)| *value)
            })
            .unwrap_or(VOID_DATUM_REF)
    }

    pub fn set_script_static_prop(
        &mut self,
        member_ref: CastMemberRef,
        name: &str,
        value: DatumRef,
    ) {
        let props = self.script_static_props.entry(member_ref).or_default();
        for (prop, slot) in props.iter_mut() {
            if prop.eq_ignore_ascii_case(name) {
                *slot = value;
                return;
            }
        }
        props.push((name.to_string(), value));
    }

    // ---- sound channels --------------------------------------------

    pub fn sound_channel(&self, channel: i32) -> Option<&SoundChannelState> {
        if channel < 1 {
            return None;
        }
        self.sound_channels.get(channel as usize - 1)
    }

    pub fn sound_play(&mut self, channel: i32, member: Option<CastMemberRef>) {
        if channel < 1 || channel as usize > self.sound_channels.len() {
            warn!("sound channel {channel} out of range");
            return;
        }
        let slot = &mut self.sound_channels[channel as usize - 1];
        slot.member = member;
        slot.playing = member.is_some();
    }

    pub fn sound_stop(&mut self, channel: i32) {
        if channel < 1 || channel as usize > self.sound_channels.len() {
            return;
        }
        let slot = &mut self.sound_channels[channel as usize - 1];
        slot.member = None;
        slot.playing = false;
    }

    // ---- movie-level properties ------------------------------------

    pub fn get_movie_prop(&mut self, prop: &str) -> Result<DatumRef, ScriptError> {
        match prop {
            "milliSeconds" => {
                let value = Datum::Int(self.elapsed_milliseconds());
                Ok(self.alloc_datum(value))
            }
            "ticks" | "timer" => {
                let value = Datum::Int(self.elapsed_milliseconds() * 60 / 1000);
                Ok(self.alloc_datum(value))
            }
            "result" => Ok(self.last_handler_result),
            "soundLevel" => Ok(self.alloc_datum(Datum::Int(self.sound_level as i32))),
            "actorList" => Ok(self
                .globals
                .get("actorList")
                .copied()
                .unwrap_or(VOID_DATUM_REF)),
            "lastChannel" => {
                let value = Datum::Int(self.movie.score.channel_count() as i32);
                Ok(self.alloc_datum(value))
            }
            "currentSpriteNum" => {
                let receiver = self.scopes.last().and_then(|scope| scope.receiver);
                let sprite_num = receiver
                    .and_then(|id| {
                        script::instance_get_prop_opt(&self.allocator, id, "spriteNum")
                    })
                    .map(|r| self.get_datum(&r).int_value().unwrap_or(0))
                    .unwrap_or(0);
                Ok(self.alloc_datum(Datum::Int(sprite_num)))
            }
            _ => {
                let datum = self.movie.get_prop(prop)?;
                Ok(self.alloc_datum(datum))
            }
        }
    }

    pub fn set_movie_prop(&mut self, prop: &str, value_ref: DatumRef) -> Result<(), ScriptError> {
        let value = self.get_datum(&value_ref).clone();
        match prop {
            "soundLevel" => {
                self.sound_level = value.int_value()?.clamp(0, 7) as u8;
                Ok(())
            }
            "actorList" => {
                if value.is_list() {
                    self.globals.insert("actorList".to_string(), value_ref);
                    Ok(())
                } else {
                    Err(ScriptError::TypeMismatch(
                        "the actorList must be a list".to_string(),
                    ))
                }
            }
            _ => self.movie.set_prop(prop, &value),
        }
    }

    // ---- object properties -----------------------------------------

    /// `obj.prop` for every receiver kind. Unknown names yield void
    /// with a log line rather than an error.
    pub fn get_obj_prop(
        &mut self,
        obj_ref: &DatumRef,
        prop: &str,
    ) -> Result<DatumRef, ScriptError> {
        let obj = self.get_datum(obj_ref).clone();
        match obj {
            Datum::ScriptInstance(instance_id) => self.instance_get_prop(instance_id, prop),
            Datum::SpriteRef(number) => {
                if prop == "scriptInstanceList" {
                    let instances: Vec<DatumRef> = self
                        .movie
                        .score
                        .get_sprite(number as i32)
                        .map(|s| s.script_instance_list.clone())
                        .unwrap_or_default()
                        .into_iter()
                        .map(|id| self.alloc_datum(Datum::ScriptInstance(id)))
                        .collect();
                    return Ok(self.alloc_datum(Datum::List(ListKind::List, instances, false)));
                }
                let datum = match self.movie.score.get_sprite(number as i32) {
                    Some(sprite) => sprite.get_prop(prop)?,
                    None => Datum::Void,
                };
                Ok(self.alloc_datum(datum))
            }
            Datum::CastMember(member_ref) => {
                let datum = self
                    .movie
                    .cast_manager
                    .find_member_by_ref(&member_ref)
                    .and_then(|member| member.prop(prop));
                match datum {
                    Some(datum) => Ok(self.alloc_datum(datum)),
                    None => {
                        debug!("member {member_ref:?} has no property {prop}");
                        Ok(VOID_DATUM_REF)
                    }
                }
            }
            Datum::List(_, items, _) => match prop {
                "count" => Ok(self.alloc_datum(Datum::Int(items.len() as i32))),
                "ilk" => Ok(self.alloc_datum(Datum::Symbol("list".to_string()))),
                other => {
                    debug!("list has no property {other}");
                    Ok(VOID_DATUM_REF)
                }
            },
            Datum::PropList(entries, _) => {
                if prop == "count" {
                    return Ok(self.alloc_datum(Datum::Int(entries.len() as i32)));
                }
                // Dot access reads entries by key.
                let key = Datum::Symbol(prop.to_string());
                let found = entries.iter().find(|(k, _)| {
                    compare::datum_equals(&self.allocator, self.get_datum(k), &key)
                });
                Ok(found.map(|(_, v)| *v).unwrap_or(VOID_DATUM_REF))
            }
            Datum::String(_) | Datum::StringChunk(..) => {
                let text = obj.string_value()?;
                match prop {
                    "length" => Ok(self.alloc_datum(Datum::Int(text.chars().count() as i32))),
                    "chars" | "words" | "items" | "lines" => {
                        let kind = match prop {
                            "chars" => crate::director::lingo::datum::StringChunkKind::Char,
                            "words" => crate::director::lingo::datum::StringChunkKind::Word,
                            "items" => crate::director::lingo::datum::StringChunkKind::Item,
                            _ => crate::director::lingo::datum::StringChunkKind::Line,
                        };
                        let count =
                            string_chunk::chunk_count(&text, kind, self.movie.item_delimiter);
                        Ok(self.alloc_datum(Datum::Int(count as i32)))
                    }
                    other => {
                        debug!("string has no property {other}");
                        Ok(VOID_DATUM_REF)
                    }
                }
            }
            Datum::IntPoint((x, y)) => match prop {
                "locH" | "x" => Ok(self.alloc_datum(Datum::Int(x))),
                "locV" | "y" => Ok(self.alloc_datum(Datum::Int(y))),
                _ => Ok(VOID_DATUM_REF),
            },
            Datum::IntRect((l, t, r, b)) => match prop {
                "left" => Ok(self.alloc_datum(Datum::Int(l))),
                "top" => Ok(self.alloc_datum(Datum::Int(t))),
                "right" => Ok(self.alloc_datum(Datum::Int(r))),
                "bottom" => Ok(self.alloc_datum(Datum::Int(b))),
                "width" => Ok(self.alloc_datum(Datum::Int(r - l))),
                "height" => Ok(self.alloc_datum(Datum::Int(b - t))),
                _ => Ok(VOID_DATUM_REF),
            },
            Datum::Color(red, green, blue) => match prop {
                "red" => Ok(self.alloc_datum(Datum::Int(red as i32))),
                "green" => Ok(self.alloc_datum(Datum::Int(green as i32))),
                "blue" => Ok(self.alloc_datum(Datum::Int(blue as i32))),
                _ => Ok(VOID_DATUM_REF),
            },
            Datum::SoundChannel(channel) => match prop {
                "volume" => {
                    let volume = self
                        .sound_channel(channel as i32)
                        .map(|c| c.volume as i32)
                        .unwrap_or(0);
                    Ok(self.alloc_datum(Datum::Int(volume)))
                }
                "member" => {
                    let member = self
                        .sound_channel(channel as i32)
                        .and_then(|c| c.member)
                        .map(Datum::CastMember)
                        .unwrap_or(Datum::Void);
                    Ok(self.alloc_datum(member))
                }
                _ => Ok(VOID_DATUM_REF),
            },
            Datum::TimeoutRef(name) => {
                let timeout = self.timeout_manager.get(&name);
                let datum = match (prop, timeout) {
                    ("name", _) => Datum::String(name.clone()),
                    ("period", Some(t)) => Datum::Int(t.period_ms as i32),
                    ("target", Some(t)) => t
                        .target
                        .map(Datum::ScriptInstance)
                        .unwrap_or(Datum::Void),
                    _ => Datum::Void,
                };
                Ok(self.alloc_datum(datum))
            }
            other => {
                warn!("cannot read property {prop} of {}", other.type_str());
                Ok(VOID_DATUM_REF)
            }
        }
    }

    pub fn set_obj_prop(
        &mut self,
        obj_ref: &DatumRef,
        prop: &str,
        value_ref: DatumRef,
    ) -> Result<(), ScriptError> {
        let obj = self.get_datum(obj_ref).clone();
        match obj {
            Datum::ScriptInstance(instance_id) => {
                self.instance_set_prop(instance_id, prop, value_ref)
            }
            Datum::SpriteRef(number) => {
                let value = self.get_datum(&value_ref).clone();
                match self.movie.score.get_sprite_mut(number as i32) {
                    Some(sprite) => sprite.set_prop(prop, &value),
                    None => {
                        warn!("no sprite {number} to set {prop} on");
                        Ok(())
                    }
                }
            }
            Datum::CastMember(member_ref) => {
                let value = self.get_datum(&value_ref).clone();
                match prop {
                    "text" => {
                        let text = value.string_value()?;
                        if let Some(member) =
                            self.movie.cast_manager.find_mut_member_by_ref(&member_ref)
                        {
                            if let Some(field) = member.member_type.as_field_mut() {
                                field.text = text;
                            } else if let Some(text_member) = member.member_type.as_text_mut() {
                                text_member.text = text;
                            }
                        }
                        Ok(())
                    }
                    "name" => {
                        let name = value.string_value()?;
                        if let Some(member) =
                            self.movie.cast_manager.find_mut_member_by_ref(&member_ref)
                        {
                            member.name = name;
                        }
                        Ok(())
                    }
                    other => {
                        warn!("ignoring write to member property {other}");
                        Ok(())
                    }
                }
            }
            Datum::IntPoint(_) => {
                let value = self.get_datum(&value_ref).int_value()?;
                if let Datum::IntPoint((x, y)) = self.get_datum_mut(obj_ref) {
                    match prop {
                        "locH" | "x" => *x = value,
                        "locV" | "y" => *y = value,
                        other => {
                            warn!("point has no property {other}");
                        }
                    }
                }
                Ok(())
            }
            Datum::IntRect(_) => {
                let value = self.get_datum(&value_ref).int_value()?;
                if let Datum::IntRect((l, t, r, b)) = self.get_datum_mut(obj_ref) {
                    match prop {
                        "left" => *l = value,
                        "top" => *t = value,
                        "right" => *r = value,
                        "bottom" => *b = value,
                        other => {
                            warn!("rect has no property {other}");
                        }
                    }
                }
                Ok(())
            }
            Datum::PropList(..) => {
                let key = self.alloc_datum(Datum::Symbol(prop.to_string()));
                handlers::list::set_a_prop(self, &[*obj_ref, key, value_ref]).map(|_| ())
            }
            Datum::SoundChannel(channel) => {
                let value = self.get_datum(&value_ref).int_value()?;
                if prop == "volume" {
                    if channel >= 1 && (channel as usize) <= self.sound_channels.len() {
                        self.sound_channels[channel as usize - 1].volume =
                            value.clamp(0, 255) as u8;
                    }
                }
                Ok(())
            }
            other => {
                warn!("cannot set property {prop} of {}", other.type_str());
                Ok(())
            }
        }
    }

    // ---- error reporting -------------------------------------------

    /// Dispatcher-boundary error sink: log and continue. The offending
    /// handler is treated as having consumed its event.
    pub fn on_script_error(&mut self, context: &str, err: &ScriptError) {
        error!("script error in {context}: {err}");
    }

    pub fn reset(&mut self) {
        self.stop();
        self.scopes.clear();
        self.globals.clear();
        self.allocator.reset();
        self.script_static_props.clear();
        self.movie.score.reset();
        self.movie.current_frame = 1;
        let actor_list = self.alloc_datum(Datum::List(ListKind::List, Vec::new(), false));
        self.globals.insert("actorList".to_string(), actor_list);
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

fn split_movie_path(path: &str) -> (String, String) {
    let normalized = path.replace('\\', "/");
    match normalized.rsplit_once('/') {
        Some((base, name)) => (name.to_string(), base.to_string()),
        None => (normalized.clone(), ".".to_string()),
    }
}
