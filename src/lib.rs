//! bevy_prompt_improver: a bevy form that rewrites prompts toward SMART goals.
//!
//! - `PromptForm` holds the input, the output and the busy flag.
//! - `submit_prompt` requests one completion; it is a no-op while busy or when
//!   the trimmed input is empty.
//! - the completion runs behind the `Completion` trait (`Completer` resource);
//!   `LlmCompletion` adapts any `llm` provider.
//! - never blocks the main thread: on native we spawn onto a tiny tokio
//!   runtime; on wasm we await on bevy's async pool.
//! - every spawned attempt settles exactly once, so busy always clears once
//!   the call returns, fails, or its task dies.

use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use flume::{Receiver, Sender, TryRecvError};
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

pub mod completion;
pub mod config;
pub mod form;
pub mod template;

pub use completion::{Completer, Completion, CompletionError, LlmCompletion};
pub use config::{ProviderConfig, normalize_oai_base};
pub use form::{FAILURE_MESSAGE, PromptForm, SUBMIT_LABEL_BUSY, SUBMIT_LABEL_IDLE};
pub use template::{SMART_CRITERIA, smart_prompt};

/// re-export the llm types needed to build a provider.
pub use llm::{
    LLMProvider,
    builder::{LLMBackend, LLMBuilder},
    error::LLMError,
};

/// on native we keep a tiny tokio runtime to drive completion futures.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Resource, Clone)]
pub struct TokioRt(pub Arc<tokio::runtime::Runtime>);

#[cfg(not(target_arch = "wasm32"))]
impl Default for TokioRt {
    fn default() -> Self {
        info!(target: "bevy_prompt_improver", "PromptImprover: initializing Tokio multi-thread runtime (native)");
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .expect("tokio runtime");
        Self(Arc::new(rt))
    }
}

/// system ordering so views can run after results land
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum ImproverSet {
    /// settled completions are applied to forms here (in `Update`)
    Drain,
}

/// one-shot marker: insert on a `PromptForm` entity to request an improvement.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct ImproveRequest;

/// request an improvement of the form's current input.
pub fn submit_prompt(commands: &mut Commands, target: Entity) {
    debug!(target: "bevy_prompt_improver", "submit_prompt -> {:?}", target);
    commands.entity(target).insert(ImproveRequest);
}

#[derive(Event, Debug)]
pub struct ImproveStarted {
    pub entity: Entity,
}
#[derive(Event, Debug)]
pub struct PromptImproved {
    pub entity: Entity,
    /// the trimmed text now shown as the form's output.
    pub text: String,
}
#[derive(Event, Debug)]
pub struct ImproveFailed {
    pub entity: Entity,
    /// diagnostic detail; the form itself only shows `FAILURE_MESSAGE`.
    pub error: String,
}

/// a completion result on its way back to the main thread.
#[derive(Debug)]
struct Settled {
    entity: Entity,
    result: Result<String, CompletionError>,
}

/// cross-thread inbox; worker tasks send, main thread drains.
#[derive(Resource, Clone)]
struct ImproveInbox {
    tx: Sender<Settled>,
    rx: Receiver<Settled>,
}

impl Default for ImproveInbox {
    fn default() -> Self {
        let (tx, rx) = flume::bounded(256);
        Self { tx, rx }
    }
}

/// parks the task (never the worker thread) while the inbox is full.
async fn push_inbox(tx: &Sender<Settled>, msg: Settled) {
    if let Err(err) = tx.send_async(msg).await {
        warn!(target: "bevy_prompt_improver", "inbox closed, dropping result for {:?}", err.0.entity);
    }
}

/// bevy plugin: wires systems, events, resources.
/// requires a `Completer` resource; requests wait until one is inserted.
pub struct PromptImproverPlugin;

impl Plugin for PromptImproverPlugin {
    fn build(&self, app: &mut App) {
        info!(target: "bevy_prompt_improver", "PromptImproverPlugin: build()");
        app.init_resource::<ImproveInbox>()
            .add_event::<ImproveStarted>()
            .add_event::<PromptImproved>()
            .add_event::<ImproveFailed>()
            .configure_sets(Update, ImproverSet::Drain)
            .add_systems(Update, drain_improve_inbox.in_set(ImproverSet::Drain))
            // spawning after the drain keeps a fresh submit busy for at least one frame
            .add_systems(Update, spawn_improve_requests.after(ImproverSet::Drain));

        #[cfg(not(target_arch = "wasm32"))]
        if app.world().get_resource::<TokioRt>().is_none() {
            app.insert_resource(TokioRt::default());
        }
    }
}

/// turns pending requests into exactly one completion attempt each.
fn spawn_improve_requests(
    mut commands: Commands,
    completer: Option<Res<Completer>>,
    inbox: Res<ImproveInbox>,
    mut q: Query<(Entity, Option<&mut PromptForm>), With<ImproveRequest>>,
    mut ev_start: EventWriter<ImproveStarted>,

    #[cfg(not(target_arch = "wasm32"))] rt: Res<TokioRt>,
) {
    let Some(completer) = completer else {
        if !q.is_empty() {
            debug!(target: "bevy_prompt_improver", "requests pending but no Completer resource yet");
        }
        return;
    };

    for (e, form) in q.iter_mut() {
        commands.entity(e).remove::<ImproveRequest>();

        let Some(mut form) = form else {
            warn!(target: "bevy_prompt_improver", "ImproveRequest on {:?} without PromptForm, ignoring", e);
            continue;
        };
        let Some(prompt) = form.begin_submit() else {
            debug!(target: "bevy_prompt_improver",
                "submit ignored: entity={:?} busy={} input_blank={}",
                e, form.is_busy(), form.input().trim().is_empty()
            );
            continue;
        };

        let completion = completer.completion();
        info!(target: "bevy_prompt_improver",
            "spawn_improve_requests: entity={:?} completer={} input_len={} prompt_len={}",
            e, completer.kind(), form.input().len(), prompt.len()
        );
        ev_start.write(ImproveStarted { entity: e });

        let tx = inbox.tx.clone();
        let pool = AsyncComputeTaskPool::get();
        #[cfg(not(target_arch = "wasm32"))]
        let rt = rt.0.clone();

        pool.spawn(async move {
            let run = async move { completion.complete(&prompt).await };

            #[cfg(target_arch = "wasm32")]
            let result = run.await;
            #[cfg(not(target_arch = "wasm32"))]
            let result = match rt.spawn(run).await {
                Ok(result) => result,
                Err(join) => Err(CompletionError::Interrupted(join.to_string())),
            };

            push_inbox(&tx, Settled { entity: e, result }).await;
        })
        .detach();
    }
}

/// applies settled completions to their forms and emits user-facing events.
fn drain_improve_inbox(
    inbox: Res<ImproveInbox>,
    mut forms: Query<&mut PromptForm>,
    mut ev_done: EventWriter<PromptImproved>,
    mut ev_err: EventWriter<ImproveFailed>,
) {
    const MAX_PER_FRAME: usize = 64;
    for _ in 0..MAX_PER_FRAME {
        let Settled { entity, result } = match inbox.rx.try_recv() {
            Ok(m) => m,
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => break,
        };
        let Ok(mut form) = forms.get_mut(entity) else {
            warn!(target: "bevy_prompt_improver", "completion settled for missing form {:?}", entity);
            continue;
        };
        match result {
            Ok(text) => {
                form.settle(Ok(text));
                info!(target: "bevy_prompt_improver", "improve completed: entity={:?} output_len={}", entity, form.output().len());
                ev_done.write(PromptImproved { entity, text: form.output().to_string() });
            }
            Err(err) => {
                let error = err.to_string();
                form.settle(Err(err));
                ev_err.write(ImproveFailed { entity, error });
            }
        }
    }
}
