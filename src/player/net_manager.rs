use std::collections::HashMap;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use log::debug;
use url::Url;

use super::net_task::{
    cache_key_for_url, fetch_net_task, resolve_candidates, HttpMethod, NetTask, NetTaskPhase,
    NetTaskState, ResourceKind, TaskId,
};

const WORKER_COUNT: usize = 2;

/// State the playback thread shares with the worker pool. Everything the
/// workers touch lives behind these mutexes; completion is observed by
/// polling only.
struct SharedNetState {
    states: Mutex<HashMap<TaskId, NetTaskState>>,
    /// Session cache of completed fetches, keyed by file name.
    cache: Mutex<HashMap<String, Vec<u8>>>,
    /// Single-flight map: cache key -> task already fetching it.
    in_flight: Mutex<HashMap<String, TaskId>>,
}

/// Asynchronous resource loader. Fetches run on a small worker pool;
/// scripts poll task state from the playback thread (`netDone`,
/// `getStreamStatus`) and are never called back from a worker.
pub struct NetManager {
    pub base_path: Option<Url>,
    tasks: HashMap<TaskId, NetTask>,
    shared: Arc<SharedNetState>,
    job_tx: Option<Sender<NetTask>>,
    workers: Vec<JoinHandle<()>>,
    next_task_id: TaskId,
    last_task_id: Option<TaskId>,
}

impl NetManager {
    pub fn new() -> NetManager {
        NetManager {
            base_path: None,
            tasks: HashMap::new(),
            shared: Arc::new(SharedNetState {
                states: Mutex::new(HashMap::new()),
                cache: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
            job_tx: None,
            workers: Vec::new(),
            next_task_id: 1,
            last_task_id: None,
        }
    }

    pub fn set_base_path(&mut self, base_path: Url) {
        self.base_path = if base_path.path().ends_with('/') {
            Some(base_path)
        } else {
            Url::parse(&format!("{base_path}/")).ok()
        };
    }

    fn ensure_workers(&mut self) {
        if self.job_tx.is_some() {
            return;
        }
        let (tx, rx) = channel::<NetTask>();
        let rx = Arc::new(Mutex::new(rx));
        for _ in 0..WORKER_COUNT {
            let rx = Arc::clone(&rx);
            let shared = Arc::clone(&self.shared);
            self.workers.push(std::thread::spawn(move || loop {
                let task = {
                    let guard = rx.lock().expect("worker queue poisoned");
                    guard.recv()
                };
                let Ok(task) = task else {
                    // Channel closed: the manager is shutting down.
                    break;
                };
                run_task(&shared, task);
            }));
        }
        self.job_tx = Some(tx);
    }

    /// Starts (or joins) a fetch and returns its task id immediately.
    pub fn preload(&mut self, url: &str, kind: ResourceKind) -> TaskId {
        self.ensure_workers();
        let cache_key = cache_key_for_url(url);

        // Single flight: a running fetch of the same resource is shared.
        if let Some(&existing) = self.shared.in_flight.lock().unwrap().get(&cache_key) {
            self.last_task_id = Some(existing);
            return existing;
        }

        let id = self.alloc_task_id();
        let candidates = resolve_candidates(self.base_path.as_ref(), url, kind);
        let task = NetTask {
            id,
            url: url.to_string(),
            cache_key: cache_key.clone(),
            candidates,
            method: HttpMethod::Get,
            post_data: None,
        };

        let mut state = NetTaskState::new(url.to_string());

        // Session cache: previously fetched bytes complete instantly.
        if let Some(bytes) = self.shared.cache.lock().unwrap().get(&cache_key) {
            state.phase = NetTaskPhase::Complete;
            state.bytes_so_far = bytes.len();
            state.bytes_total = Some(bytes.len());
            state.result = Some(Ok(bytes.clone()));
            self.shared.states.lock().unwrap().insert(id, state);
            self.tasks.insert(id, task);
            return id;
        }

        self.shared.states.lock().unwrap().insert(id, state);
        self.shared
            .in_flight
            .lock()
            .unwrap()
            .insert(cache_key, id);
        self.tasks.insert(id, task.clone());
        if let Some(tx) = &self.job_tx {
            let _ = tx.send(task);
        }
        id
    }

    /// POSTs form data; every call is a fresh task, never deduplicated.
    pub fn post(&mut self, url: &str, post_data: String) -> TaskId {
        self.ensure_workers();
        let id = self.alloc_task_id();
        let task = NetTask {
            id,
            url: url.to_string(),
            cache_key: String::new(),
            candidates: resolve_candidates(self.base_path.as_ref(), url, ResourceKind::Generic),
            method: HttpMethod::Post,
            post_data: Some(post_data),
        };
        self.shared
            .states
            .lock()
            .unwrap()
            .insert(id, NetTaskState::new(url.to_string()));
        self.tasks.insert(id, task.clone());
        if let Some(tx) = &self.job_tx {
            let _ = tx.send(task);
        }
        id
    }

    fn alloc_task_id(&mut self) -> TaskId {
        let id = self.next_task_id;
        self.next_task_id += 1;
        self.last_task_id = Some(id);
        id
    }

    /// Scripts can omit the task id; the most recent task is implied.
    pub fn effective_task_id(&self, task_id: Option<TaskId>) -> Option<TaskId> {
        task_id.or(self.last_task_id)
    }

    pub fn task_state(&self, task_id: Option<TaskId>) -> Option<NetTaskState> {
        let id = self.effective_task_id(task_id)?;
        self.shared.states.lock().unwrap().get(&id).cloned()
    }

    pub fn is_done(&self, task_id: Option<TaskId>) -> bool {
        self.task_state(task_id).map(|s| s.is_done()).unwrap_or(false)
    }

    pub fn error_code(&self, task_id: Option<TaskId>) -> Option<i32> {
        self.task_state(task_id).map(|s| s.error_code())
    }

    pub fn result_bytes(&self, task_id: Option<TaskId>) -> Option<Vec<u8>> {
        self.task_state(task_id)
            .and_then(|s| s.result)
            .and_then(|r| r.ok())
    }

    pub fn result_text(&self, task_id: Option<TaskId>) -> Option<String> {
        self.result_bytes(task_id)
            .map(|bytes| bytes.iter().map(|&b| b as char).collect())
    }

    /// Spin-waits for a task; only used for the initial movie load,
    /// never from script code.
    pub fn wait_for_task(&self, task_id: TaskId) {
        loop {
            if self
                .shared
                .states
                .lock()
                .unwrap()
                .get(&task_id)
                .map(|s| s.is_done())
                .unwrap_or(true)
            {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    /// Drops the queue and joins the pool; queued work is abandoned.
    pub fn shutdown(&mut self) {
        self.job_tx = None;
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for NetManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl Default for NetManager {
    fn default() -> Self {
        Self::new()
    }
}

fn run_task(shared: &SharedNetState, task: NetTask) {
    {
        let mut states = shared.states.lock().unwrap();
        if let Some(state) = states.get_mut(&task.id) {
            state.phase = NetTaskPhase::Loading;
        }
    }
    debug!("fetching {} (task {})", task.url, task.id);
    let result = fetch_net_task(&task);

    if !task.cache_key.is_empty() {
        if let Ok(bytes) = &result {
            shared
                .cache
                .lock()
                .unwrap()
                .insert(task.cache_key.clone(), bytes.clone());
        }
        shared.in_flight.lock().unwrap().remove(&task.cache_key);
    }

    let mut states = shared.states.lock().unwrap();
    if let Some(state) = states.get_mut(&task.id) {
        match &result {
            Ok(bytes) => {
                state.phase = NetTaskPhase::Complete;
                state.bytes_so_far = bytes.len();
                state.bytes_total = Some(bytes.len());
            }
            Err(_) => state.phase = NetTaskPhase::Error,
        }
        state.result = Some(result);
    }
}
