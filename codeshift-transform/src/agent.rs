//! Task agent
//!
//! Wraps the reasoner in units of work. Tasks live in a shared table keyed
//! by id; submitted ids travel over a bounded channel to a fixed pool of
//! workers. Each task moves through
//! `pending -> analyzing -> reasoning -> executing -> completed | failed`.

use crate::reasoner::TransformationReasoner;
use crate::types::{TransformationKind, TransformationResult};
use crate::{Result, TransformError};
use chrono::{DateTime, Utc};
use codeshift_core::AnalysisRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Concurrent tasks
    pub workers: usize,
    /// Submitted tasks that may wait before `submit` blocks
    pub queue_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Analyzing,
    Reasoning,
    Executing,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Analyzing => "analyzing",
            TaskStatus::Reasoning => "reasoning",
            TaskStatus::Executing => "executing",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low = 1,
    Normal = 2,
    High = 3,
    Critical = 4,
}

/// One transformation request and everything recorded while running it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Natural-language intent
    pub description: String,
    pub source: String,
    pub kind: TransformationKind,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub analysis: Option<AnalysisRecord>,
    pub result: Option<TransformationResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        source: impl Into<String>,
        kind: TransformationKind,
        priority: TaskPriority,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            source: source.into(),
            kind,
            priority,
            status: TaskStatus::Pending,
            analysis: None,
            result: None,
            error: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }
}

/// Snapshot of the agent's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub running: bool,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    /// Submitted but not yet picked up by a worker
    pub queued: usize,
}

type TaskTable = Arc<RwLock<HashMap<Uuid, Task>>>;

pub struct Agent {
    reasoner: Arc<TransformationReasoner>,
    config: AgentConfig,
    tasks: TaskTable,
    sender: Mutex<Option<mpsc::Sender<Uuid>>>,
    receiver: Arc<Mutex<mpsc::Receiver<Uuid>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
    queued: Arc<AtomicUsize>,
}

impl Agent {
    pub fn new(reasoner: TransformationReasoner, config: AgentConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        info!("Agent initialized with {} workers", config.workers);
        Self {
            reasoner: Arc::new(reasoner),
            config,
            tasks: Arc::new(RwLock::new(HashMap::new())),
            sender: Mutex::new(Some(sender)),
            receiver: Arc::new(Mutex::new(receiver)),
            workers: Mutex::new(Vec::new()),
            running: Arc::new(AtomicBool::new(false)),
            queued: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn reasoner(&self) -> &TransformationReasoner {
        &self.reasoner
    }

    /// Register a pending task and return its id
    pub async fn create_task(
        &self,
        description: impl Into<String>,
        source: impl Into<String>,
        kind: TransformationKind,
        priority: TaskPriority,
    ) -> Uuid {
        let task = Task::new(description, source, kind, priority);
        let id = task.id;
        self.tasks.write().await.insert(id, task);
        info!("Created task: {}", id);
        id
    }

    /// Queue a task for the workers
    pub async fn submit(&self, id: Uuid) -> Result<()> {
        if !self.tasks.read().await.contains_key(&id) {
            return Err(TransformError::TaskNotFound(id));
        }
        let sender = self
            .sender
            .lock()
            .await
            .clone()
            .ok_or_else(|| TransformError::Agent("agent is shut down".to_string()))?;

        self.queued.fetch_add(1, Ordering::SeqCst);
        if sender.send(id).await.is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            return Err(TransformError::Agent("task queue is closed".to_string()));
        }
        info!("Submitted task: {}", id);
        Ok(())
    }

    /// Spawn the worker pool. Calling it again while running does nothing.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut workers = self.workers.lock().await;
        for worker_id in 0..self.config.workers.max(1) {
            let receiver = Arc::clone(&self.receiver);
            let reasoner = Arc::clone(&self.reasoner);
            let tasks = Arc::clone(&self.tasks);
            let queued = Arc::clone(&self.queued);

            workers.push(tokio::spawn(async move {
                loop {
                    let next = receiver.lock().await.recv().await;
                    let Some(id) = next else { break };
                    queued.fetch_sub(1, Ordering::SeqCst);
                    if let Err(e) = process_task(&reasoner, &tasks, id).await {
                        error!("Worker {} could not run task {}: {}", worker_id, id, e);
                    }
                }
                info!("Worker {} stopped", worker_id);
            }));
        }
        info!("Agent started processing tasks");
    }

    /// Run one task on the calling task, bypassing the queue
    pub async fn run_task(&self, id: Uuid) -> Result<TaskStatus> {
        process_task(&self.reasoner, &self.tasks, id).await
    }

    pub async fn task(&self, id: Uuid) -> Option<Task> {
        self.tasks.read().await.get(&id).cloned()
    }

    pub async fn status(&self) -> AgentStatus {
        let tasks = self.tasks.read().await;
        let count = |status: TaskStatus| tasks.values().filter(|t| t.status == status).count();
        AgentStatus {
            running: self.running.load(Ordering::SeqCst),
            total: tasks.len(),
            completed: count(TaskStatus::Completed),
            failed: count(TaskStatus::Failed),
            queued: self.queued.load(Ordering::SeqCst),
        }
    }

    /// Stop accepting work, let the workers drain the queue and wait for them
    pub async fn shutdown(&self) {
        info!("Shutting down agent...");
        self.sender.lock().await.take();
        let handles: Vec<JoinHandle<()>> = self.workers.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Worker ended abnormally: {}", e);
            }
        }
        self.running.store(false, Ordering::SeqCst);
        info!("Agent shutdown complete");
    }
}

async fn update<F>(tasks: &TaskTable, id: Uuid, apply: F)
where
    F: FnOnce(&mut Task),
{
    if let Some(task) = tasks.write().await.get_mut(&id) {
        apply(task);
    }
}

async fn fail(tasks: &TaskTable, id: Uuid, message: String) -> TaskStatus {
    warn!("Task failed: {} - {}", id, message);
    update(tasks, id, |task| {
        task.error = Some(message);
        task.status = TaskStatus::Failed;
        task.completed_at = Some(Utc::now());
    })
    .await;
    TaskStatus::Failed
}

/// Drive one task through its lifecycle. `Err` only for an unknown id; a
/// failing transformation is recorded on the task instead.
async fn process_task(
    reasoner: &TransformationReasoner,
    tasks: &TaskTable,
    id: Uuid,
) -> Result<TaskStatus> {
    let (description, source, kind) = {
        let mut table = tasks.write().await;
        let task = table.get_mut(&id).ok_or(TransformError::TaskNotFound(id))?;
        task.started_at = Some(Utc::now());
        task.status = TaskStatus::Analyzing;
        (task.description.clone(), task.source.clone(), task.kind)
    };
    info!("Processing task {}: {}", id, description);

    let analysis = match reasoner.analyzer().analyze(&source, &id.to_string()).await {
        Ok(record) => record,
        Err(e) => return Ok(fail(tasks, id, format!("Code analysis failed: {e}")).await),
    };
    if !analysis.success {
        let reason = analysis
            .syntax_error
            .as_ref()
            .map_or_else(|| "unknown error".to_string(), ToString::to_string);
        update(tasks, id, |task| task.analysis = Some(analysis)).await;
        return Ok(fail(tasks, id, format!("Code analysis failed: {reason}")).await);
    }

    let context = serde_json::to_string(&analysis.metrics).ok();
    update(tasks, id, |task| {
        task.analysis = Some(analysis);
        task.status = TaskStatus::Reasoning;
    })
    .await;

    let result = match reasoner
        .transform(&source, &description, kind, context.as_deref())
        .await
    {
        Ok(result) => result,
        Err(e) => return Ok(fail(tasks, id, e.to_string()).await),
    };

    update(tasks, id, |task| task.status = TaskStatus::Executing).await;
    let confidence = result.confidence;
    update(tasks, id, |task| {
        task.result = Some(result);
        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
    })
    .await;

    info!("Task completed: {} (confidence {:.0}%)", id, confidence * 100.0);
    Ok(TaskStatus::Completed)
}
