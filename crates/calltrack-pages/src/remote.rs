//! Service traits backed by the hosted backend

use crate::error::PageResult;
use crate::service::{
    AppointmentService, AuthService, CallRecordService, Connector, DeviceService,
    InvitationService, LoginHistoryService, ProfileService, Services, TwoFactorService,
};
use async_trait::async_trait;
use calltrack_client::{Order, RemoteClient, procedures, tables};
use calltrack_core::types::{
    AppointmentRecord, CallRecord, CurrentUser, InvitationDetails, LoginHistoryEntry,
    OrganizationId, Profile, TrustedDevice, TwoFactorSetup, TwoFactorStatus, UserId,
};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
impl AuthService for RemoteClient {
    async fn current_user(&self) -> PageResult<CurrentUser> {
        Ok(Self::current_user(self).await?)
    }
}

#[async_trait]
impl ProfileService for RemoteClient {
    async fn profile(&self, user_id: UserId) -> PageResult<Option<Profile>> {
        Ok(self
            .from(tables::PROFILES)
            .select("*")
            .eq("user_id", user_id)
            .fetch_optional()
            .await?)
    }

    async fn organization_profiles(
        &self,
        organization_id: OrganizationId,
    ) -> PageResult<Vec<Profile>> {
        Ok(self
            .from(tables::PROFILES)
            .select("*")
            .eq("organization_id", organization_id)
            .order("user_id", Order::Ascending)
            .fetch()
            .await?)
    }
}

#[async_trait]
impl CallRecordService for RemoteClient {
    async fn calls_for_user(&self, user_id: UserId) -> PageResult<Vec<CallRecord>> {
        Ok(self
            .from(tables::CALL_RECORDS)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", Order::Descending)
            .fetch()
            .await?)
    }

    async fn organization_calls_since(
        &self,
        organization_id: OrganizationId,
        since: DateTime<Utc>,
    ) -> PageResult<Vec<CallRecord>> {
        Ok(self
            .from(tables::CALL_RECORDS)
            .select("*")
            .eq("organization_id", organization_id)
            .since("created_at", since)
            .fetch()
            .await?)
    }
}

#[async_trait]
impl AppointmentService for RemoteClient {
    async fn appointments_for_user(&self, user_id: UserId) -> PageResult<Vec<AppointmentRecord>> {
        Ok(self
            .from(tables::APPOINTMENTS)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", Order::Descending)
            .fetch()
            .await?)
    }
}

#[async_trait]
impl InvitationService for RemoteClient {
    async fn validate_invitation(&self, token: &str) -> PageResult<InvitationDetails> {
        Ok(self
            .rpc(
                procedures::VALIDATE_INVITATION,
                &json!({ "invitation_token": token }),
            )
            .await?)
    }

    async fn accept_invitation(
        &self,
        token: &str,
        full_name: &str,
        password: &str,
    ) -> PageResult<()> {
        Ok(self
            .rpc_unit(
                procedures::ACCEPT_INVITATION,
                &json!({
                    "invitation_token": token,
                    "full_name": full_name,
                    "password": password,
                }),
            )
            .await?)
    }
}

#[async_trait]
impl TwoFactorService for RemoteClient {
    async fn two_factor_status(&self) -> PageResult<TwoFactorStatus> {
        Ok(self.rpc(procedures::TWO_FACTOR_STATUS, &json!({})).await?)
    }

    async fn setup_two_factor(&self) -> PageResult<TwoFactorSetup> {
        Ok(self.rpc(procedures::SETUP_TWO_FACTOR, &json!({})).await?)
    }

    async fn enable_two_factor(&self, code: &str) -> PageResult<()> {
        Ok(self
            .rpc_unit(procedures::ENABLE_TWO_FACTOR, &json!({ "code": code }))
            .await?)
    }

    async fn disable_two_factor(&self) -> PageResult<()> {
        Ok(self
            .rpc_unit(procedures::DISABLE_TWO_FACTOR, &json!({}))
            .await?)
    }
}

#[async_trait]
impl LoginHistoryService for RemoteClient {
    async fn login_history(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> PageResult<Vec<LoginHistoryEntry>> {
        Ok(self
            .from(tables::LOGIN_HISTORY)
            .select("*")
            .eq("user_id", user_id)
            .order("created_at", Order::Descending)
            .offset(offset)
            .limit(limit)
            .fetch()
            .await?)
    }
}

#[async_trait]
impl DeviceService for RemoteClient {
    async fn trusted_devices(
        &self,
        user_id: UserId,
        offset: u64,
        limit: u64,
    ) -> PageResult<Vec<TrustedDevice>> {
        Ok(self
            .from(tables::TRUSTED_DEVICES)
            .select("*")
            .eq("user_id", user_id)
            .order("last_used_at", Order::Descending)
            .offset(offset)
            .limit(limit)
            .fetch()
            .await?)
    }

    async fn remove_trusted_device(&self, user_id: UserId, device_id: Uuid) -> PageResult<()> {
        Ok(self
            .from(tables::TRUSTED_DEVICES)
            .eq("id", device_id)
            .eq("user_id", user_id)
            .delete()
            .await?)
    }
}

impl Connector for RemoteClient {
    fn connect(&self, access_token: Option<&str>) -> Arc<dyn Services> {
        match access_token {
            Some(token) => Arc::new(self.with_access_token(token)),
            None => Arc::new(self.clone()),
        }
    }
}
