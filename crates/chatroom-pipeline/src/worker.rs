use std::sync::Arc;

use chatroom_store::Message;
use chatroom_wiki::{Summary, SummaryLookup};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

use crate::error::JobError;
use crate::pipeline::ChatPipeline;
use crate::NOT_FOUND_BODY;

/// A queued `/wiki` request.
#[derive(Debug, Clone)]
pub struct LookupJob {
    pub topic: String,
    /// Sender of the triggering message, for logs only.
    pub requested_by: String,
    /// Id of the triggering message, for logs only.
    pub message_id: String,
}

/// Drains the lookup queue, running every job as an independent task.
///
/// Jobs are never cancelled or retried: each spawned task runs to success
/// or to a logged failure, and nobody waits on it.
pub struct LookupWorker {
    rx: mpsc::Receiver<LookupJob>,
    pipeline: ChatPipeline,
    lookup: Arc<dyn SummaryLookup>,
    bot_name: String,
}

impl LookupWorker {
    pub fn new(
        rx: mpsc::Receiver<LookupJob>,
        pipeline: ChatPipeline,
        lookup: Arc<dyn SummaryLookup>,
        bot_name: impl Into<String>,
    ) -> Self {
        Self {
            rx,
            pipeline,
            lookup,
            bot_name: bot_name.into(),
        }
    }

    /// Main loop. Runs until the queue closes or `shutdown` broadcasts `true`.
    /// Tasks already spawned keep running after the loop exits.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(lookup = self.lookup.name(), "lookup worker started");
        loop {
            tokio::select! {
                job = self.rx.recv() => match job {
                    Some(job) => self.spawn(job),
                    None => {
                        info!("lookup queue closed; worker exiting");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("lookup worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    fn spawn(&self, job: LookupJob) {
        let pipeline = self.pipeline.clone();
        let lookup = Arc::clone(&self.lookup);
        let bot_name = self.bot_name.clone();
        tokio::spawn(async move {
            match run_lookup(&pipeline, lookup.as_ref(), &bot_name, &job.topic).await {
                Ok(posted) => info!(
                    topic = %job.topic,
                    trigger_id = %job.message_id,
                    message_id = %posted.id,
                    "lookup result posted"
                ),
                Err(e) => error!(
                    topic = %job.topic,
                    requested_by = %job.requested_by,
                    trigger_id = %job.message_id,
                    "lookup job failed: {e}"
                ),
            }
        });
    }
}

/// One lookup: fetch the summary and post it (or the not-found text) back
/// into the room as `bot_name`. Lookup errors end the job without posting.
pub async fn run_lookup(
    pipeline: &ChatPipeline,
    lookup: &dyn SummaryLookup,
    bot_name: &str,
    topic: &str,
) -> Result<Message, JobError> {
    let body = match lookup.summary(topic).await? {
        Summary::Found(extract) => extract,
        Summary::NotFound => {
            warn!(topic, "no summary found");
            NOT_FOUND_BODY.to_string()
        }
    };
    Ok(pipeline.send_message(bot_name, &body).await?)
}
