//! Wall-clock job runner: each scheduled job gets its own loop that sleeps
//! until the next trigger instant and then runs the job to completion.

use crate::core::clock::Clock;
use crate::core::notifications::{Job, NotificationService};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{Datelike, Duration as ChronoDuration, NaiveDateTime, NaiveTime, Weekday};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Daily { at: NaiveTime },
    Weekly { weekday: Weekday, at: NaiveTime },
}

impl Trigger {
    /// First fire instant strictly after `now`, in local time.
    pub fn next_fire_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Trigger::Daily { at } => {
                let candidate = now.date().and_time(at);
                if candidate > now {
                    candidate
                } else {
                    candidate + ChronoDuration::days(1)
                }
            }
            Trigger::Weekly { weekday, at } => {
                let ahead = (7 + weekday.num_days_from_monday() - now.weekday().num_days_from_monday()) % 7;
                let candidate = (now.date() + ChronoDuration::days(i64::from(ahead))).and_time(at);
                if candidate > now {
                    candidate
                } else {
                    candidate + ChronoDuration::days(7)
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduledJob {
    pub id: String,
    pub job: Job,
    pub trigger: Trigger,
}

/// Fire times of the notification jobs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub due_check_times: Vec<NaiveTime>,
    pub daily_summary_at: NaiveTime,
    pub weekly_report_on: Weekday,
    pub weekly_report_at: NaiveTime,
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule {
            due_check_times: vec![at(9, 0), at(18, 0)],
            daily_summary_at: at(8, 0),
            weekly_report_on: Weekday::Mon,
            weekly_report_at: at(10, 0),
        }
    }
}

impl Schedule {
    pub fn jobs(&self) -> Vec<ScheduledJob> {
        let mut jobs: Vec<ScheduledJob> = self
            .due_check_times
            .iter()
            .map(|&time| ScheduledJob {
                id: format!("{}-{}", Job::DueCheck, time.format("%H:%M")),
                job: Job::DueCheck,
                trigger: Trigger::Daily { at: time },
            })
            .collect();
        jobs.push(ScheduledJob {
            id: Job::DailySummary.to_string(),
            job: Job::DailySummary,
            trigger: Trigger::Daily {
                at: self.daily_summary_at,
            },
        });
        jobs.push(ScheduledJob {
            id: Job::WeeklyReport.to_string(),
            job: Job::WeeklyReport,
            trigger: Trigger::Weekly {
                weekday: self.weekly_report_on,
                at: self.weekly_report_at,
            },
        });
        jobs
    }
}

pub struct Scheduler<L: LoggingService + 'static, S: Storage + 'static> {
    notifications: Arc<NotificationService<L, S>>,
    clock: Arc<dyn Clock>,
    jobs: Vec<ScheduledJob>,
    shutdown_sender: Option<watch::Sender<bool>>,
    handles: Vec<JoinHandle<()>>,
}

impl<L: LoggingService + 'static, S: Storage + 'static> Scheduler<L, S> {
    pub fn new(notifications: Arc<NotificationService<L, S>>, clock: Arc<dyn Clock>, jobs: Vec<ScheduledJob>) -> Self {
        Self {
            notifications,
            clock,
            jobs,
            shutdown_sender: None,
            handles: Vec::new(),
        }
    }

    /// Spawns one loop per job. Calling it twice is a no-op.
    pub fn start(&mut self) {
        if self.shutdown_sender.is_some() {
            return;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        self.shutdown_sender = Some(shutdown_tx);

        for scheduled in &self.jobs {
            info!(job_id = %scheduled.id, trigger = ?scheduled.trigger, "Scheduling job");
            self.handles.push(tokio::spawn(Self::job_loop(
                scheduled.clone(),
                self.notifications.clone(),
                self.clock.clone(),
                shutdown_rx.clone(),
            )));
        }
    }

    /// Signals every loop and waits for them. A run in progress is aborted
    /// at its next suspension point; messages already sent stay sent.
    pub async fn stop(&mut self) {
        if let Some(sender) = self.shutdown_sender.take() {
            let _ = sender.send(true);
        }
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                error!(error = %e, "Scheduled job task ended abnormally");
            }
        }
    }

    async fn job_loop(
        scheduled: ScheduledJob,
        notifications: Arc<NotificationService<L, S>>,
        clock: Arc<dyn Clock>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        // never fire twice for the same instant, even if the clock lags
        let mut last_fire: Option<NaiveDateTime> = None;
        loop {
            let now = clock.local_now();
            let reference = last_fire.map_or(now, |last| last.max(now));
            let next = scheduled.trigger.next_fire_after(reference);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!(job_id = %scheduled.id, next = %next, "Waiting for next run");

            tokio::select! {
                _ = shutdown_rx.changed() => break,
                _ = tokio::time::sleep(wait) => {}
            }
            last_fire = Some(next);

            // a panicking run ends its own task, never this loop
            let run = tokio::spawn({
                let notifications = notifications.clone();
                let job = scheduled.job;
                async move { notifications.run(job).await }
            });
            let abort = run.abort_handle();
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    abort.abort();
                    break;
                }
                joined = run => match joined {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => error!(job_id = %scheduled.id, error = %e, "Scheduled job failed"),
                    Err(e) => error!(job_id = %scheduled.id, error = %e, "Scheduled job panicked"),
                },
            }
        }
        info!(job_id = %scheduled.id, "Scheduled job stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn moment(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(at(h, min))
    }

    #[test]
    fn daily_fires_later_today_or_tomorrow() {
        let trigger = Trigger::Daily { at: at(9, 0) };
        assert_eq!(trigger.next_fire_after(moment(2024, 3, 15, 8, 30)), moment(2024, 3, 15, 9, 0));
        assert_eq!(trigger.next_fire_after(moment(2024, 3, 15, 9, 0)), moment(2024, 3, 16, 9, 0));
        assert_eq!(trigger.next_fire_after(moment(2024, 12, 31, 18, 0)), moment(2025, 1, 1, 9, 0));
    }

    #[test]
    fn weekly_fires_on_the_configured_weekday() {
        let trigger = Trigger::Weekly {
            weekday: Weekday::Mon,
            at: at(10, 0),
        };
        // 2024-03-13 is a Wednesday
        assert_eq!(trigger.next_fire_after(moment(2024, 3, 13, 12, 0)), moment(2024, 3, 18, 10, 0));
        assert_eq!(trigger.next_fire_after(moment(2024, 3, 18, 9, 59)), moment(2024, 3, 18, 10, 0));
        assert_eq!(trigger.next_fire_after(moment(2024, 3, 18, 10, 0)), moment(2024, 3, 25, 10, 0));
    }

    #[test]
    fn default_schedule_has_four_jobs() {
        let jobs = Schedule::default().jobs();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["due-check-09:00", "due-check-18:00", "daily-summary", "weekly-report"]);
        assert_eq!(
            jobs[3].trigger,
            Trigger::Weekly {
                weekday: Weekday::Mon,
                at: at(10, 0)
            }
        );
    }
}
