//! Reviewer profile use cases.

use crate::error::{CoreError, CoreResult};
use crate::model::admin::{normalize_meet_link, Admin, AdminId};
use crate::repo::admin_repo::AdminRepository;
use log::info;

pub struct AdminService<R: AdminRepository> {
    repo: R,
}

impl<R: AdminRepository> AdminService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn profile(&self, id: AdminId) -> CoreResult<Admin> {
        self.repo
            .get_admin(id)?
            .ok_or(CoreError::not_found("admin", id))
    }

    /// Stores the reviewer's meeting link; required before claiming slots.
    pub fn set_meet_link(&self, id: AdminId, meet_link: &str) -> CoreResult<Admin> {
        let meet_link = normalize_meet_link(meet_link)?;
        self.repo.set_meet_link(id, &meet_link)?;
        info!(
            "event=admin_meet_link module=admin status=ok admin_id={}",
            id
        );
        self.profile(id)
    }

    pub fn set_access(&self, id: AdminId, access: bool) -> CoreResult<Admin> {
        self.repo.set_access(id, access)?;
        info!(
            "event=admin_access module=admin status=ok admin_id={} access={}",
            id, access
        );
        self.profile(id)
    }
}
