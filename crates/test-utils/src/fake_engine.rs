use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use isoforge::exec::{Command, EngineBackend, EngineFault, EngineFuture, ResultRow};
use isoforge::host::{HostAdapter, HostCapability};
use tokio::sync::Notify;

type Handler =
    Arc<dyn Fn(&Command, &HostAdapter) -> Result<Vec<ResultRow>, EngineFault> + Send + Sync>;

/// One recorded `invoke` call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub command: Command,
    pub started: Instant,
    pub finished: Option<Instant>,
}

#[derive(Debug, Default)]
struct ProbeState {
    invocations: Vec<Invocation>,
    active: usize,
    max_concurrent: usize,
    opened_modules: Vec<PathBuf>,
    close_count: usize,
}

/// Shared view into what a [`FakeEngine`] was asked to do. Stays usable
/// after the engine itself has been moved into a pool.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    state: Arc<Mutex<ProbeState>>,
}

impl Probe {
    fn start(&self, command: Command) -> usize {
        let mut st = self.state.lock().unwrap();
        st.active += 1;
        st.max_concurrent = st.max_concurrent.max(st.active);
        st.invocations.push(Invocation {
            command,
            started: Instant::now(),
            finished: None,
        });
        st.invocations.len() - 1
    }

    fn finish(&self, id: usize) {
        let mut st = self.state.lock().unwrap();
        st.active -= 1;
        st.invocations[id].finished = Some(Instant::now());
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().unwrap().invocations.clone()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.invocations().into_iter().map(|i| i.command).collect()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.commands()
            .iter()
            .map(|c| c.verb().to_string())
            .collect()
    }

    pub fn commands_for(&self, verb: &str) -> Vec<Command> {
        self.commands()
            .into_iter()
            .filter(|c| c.verb() == verb)
            .collect()
    }

    /// Invocations currently inside the engine.
    pub fn active(&self) -> usize {
        self.state.lock().unwrap().active
    }

    /// Highest number of invocations ever inside the engine at once.
    pub fn max_concurrent(&self) -> usize {
        self.state.lock().unwrap().max_concurrent
    }

    pub fn opened_modules(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().opened_modules.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().close_count
    }

    /// Poll until `n` invocations of `verb` have started.
    pub async fn wait_for_started(&self, verb: &str, n: usize) {
        while self.commands_for(verb).len() < n {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

/// In-process engine for tests.
///
/// Verbs without a handler succeed with no rows. Gated verbs block inside
/// the engine until their [`Notify`] is signalled once per invocation.
pub struct FakeEngine {
    handlers: HashMap<String, Handler>,
    gates: HashMap<String, Arc<Notify>>,
    prompts: HashMap<String, HostCapability>,
    delay: Duration,
    open_failure: Option<String>,
    host: Option<HostAdapter>,
    probe: Probe,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            gates: HashMap::new(),
            prompts: HashMap::new(),
            delay: Duration::ZERO,
            open_failure: None,
            host: None,
            probe: Probe::default(),
        }
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    /// Reply to `verb` with rows computed from the command.
    pub fn on<F>(self, verb: &str, f: F) -> Self
    where
        F: Fn(&Command) -> Vec<ResultRow> + Send + Sync + 'static,
    {
        self.on_with_host(verb, move |cmd, _| Ok(f(cmd)))
    }

    /// Reply to `verb` with fixed rows.
    pub fn rows(self, verb: &str, rows: Vec<ResultRow>) -> Self {
        self.on(verb, move |_| rows.clone())
    }

    /// Full control: the handler may write through the host and may fail.
    pub fn on_with_host<F>(mut self, verb: &str, f: F) -> Self
    where
        F: Fn(&Command, &HostAdapter) -> Result<Vec<ResultRow>, EngineFault>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.insert(verb.to_string(), Arc::new(f));
        self
    }

    pub fn fail(self, verb: &str, message: &str) -> Self {
        let message = message.to_string();
        self.on_with_host(verb, move |_, _| Err(EngineFault::script(message.clone())))
    }

    /// `verb` asks the host for `capability` instead of completing.
    pub fn prompt_on(mut self, verb: &str, capability: HostCapability) -> Self {
        self.prompts.insert(verb.to_string(), capability);
        self
    }

    /// Gate `verb`: each invocation waits for one `notify_one()`.
    pub fn gate(&mut self, verb: &str) -> Arc<Notify> {
        self.gates
            .entry(verb.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Hold every invocation for `delay` inside the engine.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fail_open(mut self, message: &str) -> Self {
        self.open_failure = Some(message.to_string());
        self
    }

    pub fn boxed(self) -> Box<dyn EngineBackend> {
        Box::new(self)
    }

    async fn run(&mut self, command: Command) -> Result<Vec<ResultRow>, EngineFault> {
        let host = self
            .host
            .clone()
            .ok_or_else(|| EngineFault::Transport("fake engine not open".into()))?;
        let verb = command.verb().to_string();
        let id = self.probe.start(command.clone());

        if let Some(gate) = self.gates.get(&verb) {
            gate.notified().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let result = match self.prompts.get(&verb) {
            Some(capability) => Err(host.refuse(*capability).into()),
            None => match self.handlers.get(&verb) {
                Some(handler) => handler(&command, &host),
                None => Ok(Vec::new()),
            },
        };

        self.probe.finish(id);
        result
    }
}

impl EngineBackend for FakeEngine {
    fn open<'a>(&'a mut self, module: &'a Path, host: HostAdapter) -> EngineFuture<'a, ()> {
        Box::pin(async move {
            if let Some(message) = &self.open_failure {
                return Err(EngineFault::script(message.clone()));
            }
            self.probe
                .state
                .lock()
                .unwrap()
                .opened_modules
                .push(module.to_path_buf());
            self.host = Some(host);
            Ok(())
        })
    }

    fn invoke(&mut self, command: Command) -> EngineFuture<'_, Vec<ResultRow>> {
        Box::pin(self.run(command))
    }

    fn close(&mut self) -> EngineFuture<'_, ()> {
        Box::pin(async move {
            self.probe.state.lock().unwrap().close_count += 1;
            self.host = None;
            Ok(())
        })
    }
}
