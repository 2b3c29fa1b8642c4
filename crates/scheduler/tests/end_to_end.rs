//! Scheduler driven through its public API against real stores.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use nudge_core::{Clock, ManualClock, Recurrence, Reminder, SchedulerConfig};
use nudge_notify::{
    Notification, NotificationChannel, NotificationPlatform, NotificationRenderer, NotifyError,
    Permission,
};
use nudge_scheduler::{JsonFileStore, MemoryStore, ReminderScheduler, ReminderStore};

#[derive(Default)]
struct Inbox {
    shown: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationPlatform for Inbox {
    async fn permission(&self) -> Permission {
        Permission::Granted
    }

    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    fn platform_name(&self) -> &str {
        "inbox"
    }
}

fn march(day: u32, hour: u32, minute: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

const STORE_JSON: &str = r#"[
  {
    "id": "r1",
    "text": "Stand-up",
    "date": "2024-03-10",
    "time": "09:00",
    "recurrence": "daily",
    "completed": false,
    "completedAt": null,
    "notes": "Room 4"
  },
  {
    "id": "broken",
    "text": "no date here"
  },
  {
    "id": "later",
    "text": "Dentist",
    "date": "2024-03-10",
    "time": "15:30",
    "recurrence": "",
    "completed": false
  }
]"#;

#[tokio::test]
async fn daily_reminder_from_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reminders.json");
    std::fs::write(&path, STORE_JSON).unwrap();

    let store = Arc::new(JsonFileStore::new(&path));
    let inbox = Arc::new(Inbox::default());
    let clock = Arc::new(ManualClock::new(march(10, 9, 1)));
    let renderer = NotificationRenderer::new(
        "Reminder: {{ text }}".to_string(),
        "{{ text }} at {{ time }}{% if notes %} ({{ notes }}){% endif %}".to_string(),
    )
    .unwrap();

    let scheduler = ReminderScheduler::builder(
        Arc::clone(&store) as Arc<dyn ReminderStore>,
        Arc::new(NotificationChannel::new(
            Arc::clone(&inbox) as Arc<dyn NotificationPlatform>
        )),
    )
    .renderer(renderer)
    .clock(Arc::clone(&clock) as Arc<dyn Clock>)
    .build();

    // The broken record is skipped; the other two are evaluated.
    let report = scheduler.tick().await;
    assert_eq!(report.evaluated, 2);
    assert_eq!(report.due, 1);
    assert_eq!(report.delivered, 1);

    {
        let shown = inbox.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, "Reminder: Stand-up");
        assert_eq!(shown[0].body, "Stand-up at 09:00 (Room 4)");
        assert_eq!(shown[0].tag.as_deref(), Some("r1"));
    }
    let active: Vec<String> = scheduler.active().into_iter().map(|r| r.id).collect();
    assert_eq!(active, vec!["r1"]);

    // Completing stores tomorrow's occurrence next to the original.
    let successor = scheduler.complete_reminder("r1").await.unwrap().unwrap();
    assert_eq!(successor.date, NaiveDate::from_ymd_opt(2024, 3, 11).unwrap());
    assert_eq!(successor.time, NaiveTime::from_hms_opt(9, 0, 0));
    assert_eq!(successor.recurrence, Recurrence::Daily);
    assert!(scheduler.active().is_empty());

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed.iter().any(|r| r.id == "r1" && r.completed && r.completed_at.is_some()));
    assert!(listed.iter().any(|r| r.id == successor.id && !r.completed));

    // The malformed record survived the rewrite.
    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let ids: Vec<&str> = raw
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r.get("id").and_then(|v| v.as_str()))
        .collect();
    assert!(ids.contains(&"broken"));

    // Afternoon: the dentist surfaces, tomorrow's stand-up does not.
    clock.set(march(10, 15, 30));
    scheduler.tick().await;
    let active: Vec<String> = scheduler.active().into_iter().map(|r| r.id).collect();
    assert_eq!(active, vec!["later"]);

    clock.set(march(11, 9, 0));
    scheduler.tick().await;
    let active: Vec<String> = scheduler.active().into_iter().map(|r| r.id).collect();
    assert_eq!(active, vec!["later".to_string(), successor.id]);
    assert_eq!(inbox.shown.lock().unwrap().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn running_scheduler_feeds_hub_subscribers() {
    let store = Arc::new(MemoryStore::new());
    let inbox = Arc::new(Inbox::default());
    let scheduler = ReminderScheduler::builder(
        Arc::clone(&store) as Arc<dyn ReminderStore>,
        Arc::new(NotificationChannel::new(
            Arc::clone(&inbox) as Arc<dyn NotificationPlatform>
        )),
    )
    .config(SchedulerConfig::with_interval_ms(1_000))
    .clock(Arc::new(ManualClock::new(march(10, 12, 0))))
    .build();

    let views = Arc::new(Mutex::new(Vec::<Vec<String>>::new()));
    let sink = Arc::clone(&views);
    let sub = scheduler.hub().subscribe(move |active| {
        sink.lock()
            .unwrap()
            .push(active.iter().map(|r| r.text.clone()).collect());
    });

    assert!(scheduler.start().await);
    scheduler
        .create_reminder(Reminder::new("water plants", NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1_001)).await;
    let dismissed = scheduler.active()[0].id.clone();
    assert!(scheduler.on_dismissed(&dismissed));

    tokio::time::sleep(Duration::from_millis(5_000)).await;
    scheduler.stop();

    assert_eq!(
        *views.lock().unwrap(),
        vec![
            Vec::<String>::new(),
            vec!["water plants".to_string()],
            Vec::<String>::new(),
        ]
    );
    assert_eq!(inbox.shown.lock().unwrap().len(), 1);
    assert!(sub.unsubscribe());
}
