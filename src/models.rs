//! Typed API payloads.
//!
//! Timestamp fields are declared as `DateTime<Utc>`, so they are decoded once
//! while the envelope is unwrapped, in nested objects and list items alike.
//! Fields the client does not model are kept verbatim in `extra`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Status of an actor build or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum ActorJobStatus {
    /// Queued, not started yet.
    Ready,
    /// In progress.
    Running,
    /// Finished successfully.
    Succeeded,
    /// Finished with an error.
    Failed,
    /// Timing out.
    TimingOut,
    /// Timed out.
    TimedOut,
    /// Being aborted.
    Aborting,
    /// Aborted.
    Aborted,
    /// A status this client does not know about.
    #[serde(other)]
    Unknown,
}

impl ActorJobStatus {
    /// Returns `true` once the job will not change any more.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ActorJobStatus::Succeeded
                | ActorJobStatus::Failed
                | ActorJobStatus::TimedOut
                | ActorJobStatus::Aborted
        )
    }

    /// The wire form, as used in the `status` filter of run listings.
    pub fn as_wire(self) -> &'static str {
        match self {
            ActorJobStatus::Ready => "READY",
            ActorJobStatus::Running => "RUNNING",
            ActorJobStatus::Succeeded => "SUCCEEDED",
            ActorJobStatus::Failed => "FAILED",
            ActorJobStatus::TimingOut => "TIMING-OUT",
            ActorJobStatus::TimedOut => "TIMED-OUT",
            ActorJobStatus::Aborting => "ABORTING",
            ActorJobStatus::Aborted => "ABORTED",
            ActorJobStatus::Unknown => "UNKNOWN",
        }
    }

    /// Parses the wire form, e.g. `TIMED-OUT`.
    pub fn from_wire(status: &str) -> Self {
        serde_json::from_value(Value::String(status.to_string())).unwrap_or(ActorJobStatus::Unknown)
    }
}

/// One page of a collection listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedList<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items in the collection.
    pub total: u64,
    /// Offset of the first item.
    pub offset: u64,
    /// Page size requested.
    pub limit: u64,
    /// Number of items on this page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Whether the listing is newest first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<bool>,
}

/// An actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Actor id.
    pub id: String,
    /// Actor name, unique within the owner's account.
    #[serde(default)]
    pub name: String,
    /// Id of the owner.
    pub user_id: Option<String>,
    /// Username of the owner.
    pub username: Option<String>,
    /// Whether the actor is published in the store.
    pub is_public: Option<bool>,
    /// When the actor was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the actor was last modified.
    pub modified_at: Option<DateTime<Utc>>,
    /// Usage counters.
    pub stats: Option<ActorStats>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Usage counters of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorStats {
    /// Number of builds.
    pub total_builds: Option<u64>,
    /// Number of runs.
    pub total_runs: Option<u64>,
    /// Number of distinct users.
    pub total_users: Option<u64>,
    /// Start of the most recent run.
    pub last_run_started_at: Option<DateTime<Utc>>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where a build or run came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMeta {
    /// What started the job, e.g. `API` or `SCHEDULER`.
    pub origin: Option<String>,
    /// IP address of the client that started the job.
    pub client_ip: Option<String>,
    /// User agent of the client that started the job.
    pub user_agent: Option<String>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An actor build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Build id.
    pub id: String,
    /// Id of the built actor.
    pub act_id: Option<String>,
    /// Id of the user who started the build.
    pub user_id: Option<String>,
    /// Current status.
    pub status: ActorJobStatus,
    /// When the build started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the build finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Version and build number, e.g. `0.1.3`.
    pub build_number: Option<String>,
    /// Origin of the build.
    pub meta: Option<JobMeta>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An actor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Run id.
    pub id: String,
    /// Id of the actor that runs.
    pub act_id: Option<String>,
    /// Id of the task, for runs started from a task.
    pub actor_task_id: Option<String>,
    /// Id of the user who started the run.
    pub user_id: Option<String>,
    /// Current status.
    pub status: ActorJobStatus,
    /// Status message set by the actor.
    pub status_message: Option<String>,
    /// When the run started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the run finished, if it has.
    pub finished_at: Option<DateTime<Utc>>,
    /// Id of the build being run.
    pub build_id: Option<String>,
    /// Id of the run's default dataset.
    pub default_dataset_id: Option<String>,
    /// Id of the run's default key-value store.
    pub default_key_value_store_id: Option<String>,
    /// Id of the run's default request queue.
    pub default_request_queue_id: Option<String>,
    /// Origin of the run.
    pub meta: Option<JobMeta>,
    /// Resource usage counters, as sent by the API.
    pub stats: Option<Map<String, Value>>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A saved actor task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Task id.
    pub id: String,
    /// Id of the actor the task runs.
    pub act_id: Option<String>,
    /// Id of the owner.
    pub user_id: Option<String>,
    /// Task name.
    pub name: Option<String>,
    /// When the task was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the task was last modified.
    pub modified_at: Option<DateTime<Utc>>,
    /// Saved input passed to each run.
    pub input: Option<Value>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Dataset id.
    pub id: String,
    /// Dataset name; unnamed datasets have none.
    pub name: Option<String>,
    /// Id of the owner.
    pub user_id: Option<String>,
    /// When the dataset was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the dataset was last modified.
    pub modified_at: Option<DateTime<Utc>>,
    /// When the dataset was last read or written.
    pub accessed_at: Option<DateTime<Utc>>,
    /// Number of stored items.
    pub item_count: Option<u64>,
    /// Fields not modeled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl crate::wait::JobSnapshot for Build {
    fn status(&self) -> ActorJobStatus {
        self.status
    }
}

impl crate::wait::JobSnapshot for Run {
    fn status(&self) -> ActorJobStatus {
        self.status
    }
}

impl crate::wait::JobSnapshot for Value {
    fn status(&self) -> ActorJobStatus {
        self.get("status")
            .and_then(Value::as_str)
            .map(ActorJobStatus::from_wire)
            .unwrap_or(ActorJobStatus::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(ActorJobStatus::from_wire("TIMED-OUT"), ActorJobStatus::TimedOut);
        assert_eq!(ActorJobStatus::from_wire("TIMING-OUT"), ActorJobStatus::TimingOut);
        assert_eq!(ActorJobStatus::from_wire("SOMETHING-NEW"), ActorJobStatus::Unknown);
        assert_eq!(
            serde_json::to_value(ActorJobStatus::Succeeded).unwrap(),
            json!("SUCCEEDED")
        );
    }

    #[test]
    fn test_terminal_set() {
        let terminal: Vec<_> = [
            ActorJobStatus::Ready,
            ActorJobStatus::Running,
            ActorJobStatus::Succeeded,
            ActorJobStatus::Failed,
            ActorJobStatus::TimingOut,
            ActorJobStatus::TimedOut,
            ActorJobStatus::Aborting,
            ActorJobStatus::Aborted,
        ]
        .into_iter()
        .filter(|s| s.is_terminal())
        .collect();

        assert_eq!(
            terminal,
            vec![
                ActorJobStatus::Succeeded,
                ActorJobStatus::Failed,
                ActorJobStatus::TimedOut,
                ActorJobStatus::Aborted,
            ]
        );
    }

    #[test]
    fn test_timestamps_round_trip_and_unknown_fields_untouched() {
        let started = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap();
        let wire = json!({
            "id": "run1",
            "status": "RUNNING",
            "startedAt": started.to_rfc3339(),
            "finishedAt": null,
            "meta": { "origin": "API", "scheduleName": "nightly" },
            "exitNote": "2024-05-17T08:30:00.000Z",
        });

        let run: Run = serde_json::from_value(wire).unwrap();

        assert_eq!(run.started_at, Some(started));
        assert_eq!(run.finished_at, None);
        assert_eq!(run.extra["exitNote"], json!("2024-05-17T08:30:00.000Z"));
        assert_eq!(run.meta.unwrap().extra["scheduleName"], json!("nightly"));
    }

    #[test]
    fn test_list_items_are_decoded() {
        let wire = json!({
            "items": [
                { "id": "a", "createdAt": "2019-12-12T07:34:14.202Z" },
                { "id": "b", "createdAt": "2020-01-01T00:00:00Z", "name": "b-name" },
            ],
            "total": 2, "offset": 0, "limit": 1000, "count": 2, "desc": false,
        });

        let list: PaginatedList<Dataset> = serde_json::from_value(wire).unwrap();

        assert_eq!(list.total, 2);
        assert_eq!(list.desc, Some(false));
        assert_eq!(
            list.items[1].created_at,
            Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(
            list.items[0].created_at.unwrap().timestamp_millis(),
            1_576_136_054_202
        );
    }
}
