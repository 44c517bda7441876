//! Room status board façade

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, instrument, warn};

use super::{report, single_result, split_batch, BulkOutcome, FacadeOptions};
use crate::error::{Error, Result};
use crate::gateway::{
    ensure_success, Collection, FetchQuery, FieldSelector, RecordGateway, SortDirection,
};
use crate::invariants::{assert_room_patch_invariants, room_is_consistent};
use crate::mapper::{decode_all, room_fields, FromRecord};
use crate::models::{GuestAssignment, Note, RecordId, Room, RoomStatus};
use crate::notify::{Notice, Notifier};
use crate::transitions::{
    assign_guest_patch, block_patch, checkout_patch, room_status_patch, unblock_patch, RoomPatch,
    TransitionPolicy,
};

pub struct RoomService {
    gateway: Arc<dyn RecordGateway>,
    notifier: Arc<dyn Notifier>,
    options: FacadeOptions,
}

impl RoomService {
    pub fn new(gateway: Arc<dyn RecordGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            options: FacadeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: FacadeOptions) -> Self {
        self.options = options;
        self
    }

    /// All rooms ordered by room number
    #[instrument(skip(self))]
    pub async fn get_all(&self) -> Result<Vec<Room>> {
        let result = self.fetch_all().await;
        report(self.notifier.as_ref(), "Failed to load rooms", result)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: RecordId) -> Result<Room> {
        let result = self.fetch_one(id).await;
        report(self.notifier.as_ref(), "Failed to load room", result)
    }

    /// Plain status change. `Available` clears the guest and stay times
    #[instrument(skip(self))]
    pub async fn set_status(&self, id: RecordId, status: RoomStatus) -> Result<Room> {
        let result: Result<Room> = async {
            self.check_transition(id, status).await?;
            self.write(id, room_status_patch(status, Utc::now())).await
        }
        .await;
        report(self.notifier.as_ref(), "Failed to update room status", result)
    }

    #[instrument(skip(self, guest), fields(guest = %guest.guest_name))]
    pub async fn assign_guest(&self, id: RecordId, guest: &GuestAssignment) -> Result<Room> {
        let result: Result<Room> = async {
            self.check_transition(id, RoomStatus::Occupied).await?;
            self.write(id, assign_guest_patch(guest, Utc::now())).await
        }
        .await;
        report(self.notifier.as_ref(), "Failed to assign guest", result)
    }

    /// Send the room to cleaning. The guest stays on the record until the
    /// room is made available again
    #[instrument(skip(self))]
    pub async fn checkout_guest(&self, id: RecordId) -> Result<Room> {
        let result: Result<Room> = async {
            self.check_transition(id, RoomStatus::Cleaning).await?;
            self.write(id, checkout_patch(Utc::now())).await
        }
        .await;
        report(self.notifier.as_ref(), "Failed to checkout guest", result)
    }

    #[instrument(skip(self))]
    pub async fn block_room(&self, id: RecordId, reason: &str) -> Result<Room> {
        let result: Result<Room> = async {
            self.check_transition(id, RoomStatus::OutOfOrder).await?;
            self.write(id, block_patch(reason, Utc::now())).await
        }
        .await;
        report(self.notifier.as_ref(), "Failed to block room", result)
    }

    #[instrument(skip(self))]
    pub async fn unblock_room(&self, id: RecordId) -> Result<Room> {
        let result: Result<Room> = async {
            self.check_transition(id, RoomStatus::Available).await?;
            self.write(id, unblock_patch(Utc::now())).await
        }
        .await;
        report(self.notifier.as_ref(), "Failed to unblock room", result)
    }

    /// Same change as [`Self::set_status`] for many rooms in one request
    #[instrument(skip(self))]
    pub async fn bulk_set_status(
        &self,
        ids: &[RecordId],
        status: RoomStatus,
    ) -> Result<BulkOutcome<Room>> {
        let now = Utc::now();
        self.write_many("update", ids, |_| room_status_patch(status, now))
            .await
    }

    /// Same change as [`Self::block_room`] for many rooms in one request
    #[instrument(skip(self))]
    pub async fn bulk_block(&self, ids: &[RecordId], reason: &str) -> Result<BulkOutcome<Room>> {
        let now = Utc::now();
        self.write_many("block", ids, |_| block_patch(reason, now))
            .await
    }

    /// Append a note; re-reads the room so the list is current
    #[instrument(skip(self, content))]
    pub async fn add_note(&self, id: RecordId, content: &str) -> Result<Room> {
        let result: Result<Room> = async {
            let room = self.fetch_one(id).await?;
            let mut notes = room.notes;
            notes.push(Note::new(content.to_string(), self.options.operator.clone()));

            let patch = RoomPatch::new().notes(&notes)?.last_updated(Utc::now());
            self.write(id, patch).await
        }
        .await;
        report(self.notifier.as_ref(), "Failed to add note", result)
    }

    async fn fetch_all(&self) -> Result<Vec<Room>> {
        let query = FetchQuery::select(room_fields::ALL)
            .order_by(room_fields::ROOM_NUMBER, SortDirection::Ascending);
        let resp = self.gateway.fetch_records(Collection::Rooms, &query).await?;
        ensure_success(resp.success, resp.message.as_deref())?;

        debug!(count = resp.data.len(), "Fetched rooms");
        let rooms: Vec<Room> = decode_all(&resp.data);
        for room in rooms.iter().filter(|r| !room_is_consistent(r)) {
            warn!(id = %room.id, status = %room.status, "Room record is inconsistent");
        }
        Ok(rooms)
    }

    async fn fetch_one(&self, id: RecordId) -> Result<Room> {
        let not_found = || Error::NotFound(format!("Room with ID {} not found", id));

        let resp = match self
            .gateway
            .get_record_by_id(Collection::Rooms, id, &FieldSelector::list(room_fields::ALL))
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(%id, error = %e, "Room lookup failed");
                return Err(not_found());
            }
        };

        match resp.data {
            Some(raw) if resp.success => Room::from_record(&raw),
            _ => {
                warn!(%id, message = ?resp.message, "Room lookup returned nothing");
                Err(not_found())
            }
        }
    }

    async fn check_transition(&self, id: RecordId, to: RoomStatus) -> Result<()> {
        if self.options.policy == TransitionPolicy::Unrestricted {
            return Ok(());
        }
        let current = self.fetch_one(id).await?;
        self.options.policy.check_room(current.status, to)
    }

    async fn write(&self, id: RecordId, patch: RoomPatch) -> Result<Room> {
        assert_room_patch_invariants(&patch);
        let resp = self
            .gateway
            .update_records(Collection::Rooms, vec![patch.into_record(id)])
            .await?;
        single_result(resp)
    }

    async fn write_many<F>(
        &self,
        verb: &str,
        ids: &[RecordId],
        build: F,
    ) -> Result<BulkOutcome<Room>>
    where
        F: Fn(RecordId) -> RoomPatch,
    {
        if ids.is_empty() {
            return Ok(BulkOutcome::default());
        }

        let records = ids
            .iter()
            .map(|id| {
                let patch = build(*id);
                assert_room_patch_invariants(&patch);
                patch.into_record(*id)
            })
            .collect();

        let result: Result<BulkOutcome<Room>> = async {
            let resp = self.gateway.update_records(Collection::Rooms, records).await?;
            ensure_success(resp.success, resp.message.as_deref())?;
            Ok(split_batch::<Room>(ids, resp))
        }
        .await;
        let outcome = report(
            self.notifier.as_ref(),
            &format!("Failed to {} rooms", verb),
            result,
        )?;

        if !outcome.is_complete() {
            self.notifier.notify(Notice::error(format!(
                "Failed to {} {} of {} rooms",
                verb,
                outcome.failed.len(),
                ids.len()
            )));
        }

        Ok(outcome)
    }
}
