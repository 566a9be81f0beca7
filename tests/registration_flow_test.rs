//! Registration lifecycle scenario tests
//!
//! Drives the pure transition logic through an in-memory event world, so the
//! full join / cancel / promote / check-in choreography is exercised without a
//! database. The persistence layer applies exactly these decisions inside its
//! transactions.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use Gatherly::models::event::{Event, EventStatus};
use Gatherly::models::registration::{Registration, RegistrationStatus};
use Gatherly::services::attendance::ensure_can_check_in;
use Gatherly::services::promotion::effective_slots;
use Gatherly::services::registration::{plan_join, JoinPlan};
use Gatherly::utils::errors::GatherlyError;

/// One event and its registration rows, mutated the way the services mutate
/// the database
struct EventWorld {
    event: Event,
    rows: Vec<Registration>,
    clock: DateTime<Utc>,
}

impl EventWorld {
    fn new(max_capacity: Option<i32>) -> Self {
        let now = Utc::now();
        Self {
            event: Event {
                id: Uuid::new_v4(),
                slug: "summer-meetup".into(),
                title: "Summer Meetup".into(),
                description: String::new(),
                location: "Main Hall".into(),
                location_map_url: None,
                image_url: String::new(),
                instagram_url: None,
                event_date: now + Duration::days(14),
                max_capacity,
                registration_status: EventStatus::Open,
                category_id: None,
                created_by: None,
                created_at: now,
                updated_at: now,
            },
            rows: Vec::new(),
            clock: now,
        }
    }

    fn registered_count(&self) -> i64 {
        self.rows
            .iter()
            .filter(|r| r.status == RegistrationStatus::Registered)
            .count() as i64
    }

    fn row_for(&self, user_id: Uuid) -> Option<&Registration> {
        self.rows.iter().find(|r| r.user_id == user_id)
    }

    /// Apply a join the way the registration service does under its lock
    fn join(&mut self, user_id: Uuid) -> Result<RegistrationStatus, GatherlyError> {
        // Registration timestamps must be strictly ordered for FIFO assertions
        self.clock += Duration::seconds(1);

        let plan = plan_join(
            &self.event,
            self.row_for(user_id),
            self.registered_count(),
            self.clock,
        )?;

        let status = plan.status();
        match plan {
            JoinPlan::Insert { status } => {
                self.rows.push(Registration {
                    id: Uuid::new_v4(),
                    event_id: self.event.id,
                    user_id,
                    status,
                    registered_at: self.clock,
                    attended: false,
                    attended_at: None,
                });
            }
            JoinPlan::Reactivate {
                registration_id,
                status,
            } => {
                let registered_at = self.clock;
                let row = self
                    .rows
                    .iter_mut()
                    .find(|r| r.id == registration_id)
                    .expect("reactivation targets an existing row");
                row.status = status;
                row.registered_at = registered_at;
                row.attended = false;
                row.attended_at = None;
            }
        }
        Ok(status)
    }

    /// Cancel a user's row; a freed REGISTERED slot promotes one waiter
    fn leave(&mut self, user_id: Uuid) -> Result<usize, GatherlyError> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.user_id == user_id)
            .ok_or(GatherlyError::RegistrationNotFound)?;

        let freed = row.status == RegistrationStatus::Registered;
        row.status = RegistrationStatus::Cancelled;

        if freed {
            Ok(self.promote(1))
        } else {
            Ok(0)
        }
    }

    /// FIFO promotion, re-capped against current registered count
    fn promote(&mut self, requested: i64) -> usize {
        let open = effective_slots(
            requested,
            self.event.max_capacity,
            self.registered_count(),
        );

        let mut waiting: Vec<Uuid> = self
            .rows
            .iter()
            .filter(|r| r.status == RegistrationStatus::WaitingList)
            .map(|r| r.id)
            .collect();
        waiting.sort_by_key(|id| {
            self.rows
                .iter()
                .find(|r| r.id == *id)
                .map(|r| r.registered_at)
        });
        waiting.truncate(open.max(0) as usize);

        for id in &waiting {
            if let Some(row) = self.rows.iter_mut().find(|r| r.id == *id) {
                row.status = RegistrationStatus::Registered;
            }
        }
        waiting.len()
    }

    /// Check in a row, enforcing the scan guard
    fn check_in(&mut self, user_id: Uuid) -> Result<(), GatherlyError> {
        let clock = self.clock;
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.user_id == user_id)
            .ok_or(GatherlyError::RegistrationNotFound)?;

        ensure_can_check_in(row.status, row.attended)?;
        row.attended = true;
        row.attended_at = Some(clock);
        Ok(())
    }

    fn status_of(&self, user_id: Uuid) -> RegistrationStatus {
        self.row_for(user_id).expect("row exists").status
    }
}

fn users(n: usize) -> Vec<Uuid> {
    (0..n).map(|_| Uuid::new_v4()).collect()
}

#[test]
fn test_joins_overflow_to_waiting_list_at_capacity() {
    let mut world = EventWorld::new(Some(2));
    let members = users(3);

    assert_eq!(world.join(members[0]).unwrap(), RegistrationStatus::Registered);
    assert_eq!(world.join(members[1]).unwrap(), RegistrationStatus::Registered);
    assert_eq!(world.join(members[2]).unwrap(), RegistrationStatus::WaitingList);
    assert_eq!(world.registered_count(), 2);
}

#[test]
fn test_freed_slot_promotes_first_in_line() {
    let mut world = EventWorld::new(Some(2));
    let members = users(4);
    for member in &members {
        world.join(*member).unwrap();
    }

    // Two waiting; the first registered leaves, the earliest waiter gets in
    let promoted = world.leave(members[0]).unwrap();
    assert_eq!(promoted, 1);
    assert_eq!(world.status_of(members[2]), RegistrationStatus::Registered);
    assert_eq!(world.status_of(members[3]), RegistrationStatus::WaitingList);
    assert_eq!(world.registered_count(), 2);
}

#[test]
fn test_leaving_from_waiting_list_promotes_nobody() {
    let mut world = EventWorld::new(Some(1));
    let members = users(3);
    for member in &members {
        world.join(*member).unwrap();
    }

    let promoted = world.leave(members[2]).unwrap();
    assert_eq!(promoted, 0);
    assert_eq!(world.status_of(members[1]), RegistrationStatus::WaitingList);
}

#[test]
fn test_capacity_increase_promotes_in_order_up_to_the_delta() {
    let mut world = EventWorld::new(Some(2));
    let members = users(5);
    for member in &members {
        world.join(*member).unwrap();
    }
    // members[2..5] are waiting

    world.event.max_capacity = Some(4);
    let promoted = world.promote(4);

    assert_eq!(promoted, 2);
    assert_eq!(world.status_of(members[2]), RegistrationStatus::Registered);
    assert_eq!(world.status_of(members[3]), RegistrationStatus::Registered);
    assert_eq!(world.status_of(members[4]), RegistrationStatus::WaitingList);
    assert_eq!(world.registered_count(), 4);
}

#[test]
fn test_rejoin_after_cancel_reactivates_and_clears_attendance() {
    let mut world = EventWorld::new(None);
    let member = users(1)[0];

    world.join(member).unwrap();
    world.check_in(member).unwrap();
    let original_id = world.row_for(member).unwrap().id;

    world.leave(member).unwrap();
    assert_eq!(world.status_of(member), RegistrationStatus::Cancelled);

    let status = world.join(member).unwrap();
    assert_eq!(status, RegistrationStatus::Registered);

    let row = world.row_for(member).unwrap();
    // Same row, fresh claim
    assert_eq!(row.id, original_id);
    assert!(!row.attended);
    assert!(row.attended_at.is_none());
    assert_eq!(world.rows.len(), 1);
}

#[test]
fn test_returnee_lands_on_waiting_list_when_slot_was_refilled() {
    let mut world = EventWorld::new(Some(2));
    let members = users(3);
    for member in &members {
        world.join(*member).unwrap();
    }

    // members[0] leaves, members[2] is promoted into the slot
    world.leave(members[0]).unwrap();
    assert_eq!(world.status_of(members[2]), RegistrationStatus::Registered);

    // Coming back finds the event full again
    let status = world.join(members[0]).unwrap();
    assert_eq!(status, RegistrationStatus::WaitingList);
}

#[test]
fn test_double_join_is_rejected() {
    let mut world = EventWorld::new(None);
    let member = users(1)[0];

    world.join(member).unwrap();
    assert!(matches!(
        world.join(member),
        Err(GatherlyError::AlreadyRegistered)
    ));
}

#[test]
fn test_check_in_rules_over_the_lifecycle() {
    let mut world = EventWorld::new(Some(1));
    let members = users(2);
    world.join(members[0]).unwrap();
    world.join(members[1]).unwrap();

    // Waiting-list ticket is not valid at the door
    assert!(matches!(
        world.check_in(members[1]),
        Err(GatherlyError::InvalidAttendanceState)
    ));

    world.check_in(members[0]).unwrap();
    // Second scan of the same ticket
    assert!(matches!(
        world.check_in(members[0]),
        Err(GatherlyError::AlreadyCheckedIn)
    ));
}

#[test]
fn test_serial_leave_and_join_never_exceeds_capacity() {
    let mut world = EventWorld::new(Some(3));
    let members = users(8);
    for member in &members {
        world.join(*member).unwrap();
    }

    // Churn: registered members leave, waiters promote, leavers rejoin
    for round in 0..3 {
        let leaver = members[round];
        world.leave(leaver).unwrap();
        world.join(leaver).unwrap();
        assert!(world.registered_count() <= 3, "round {round} overshot");
    }
}
