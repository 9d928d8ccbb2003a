use super::{check_status, GmailClient};
use crate::error::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Bypass trash; requires the full-mailbox scope.
    #[default]
    Permanent,
    Trash,
}

impl GmailClient {
    pub(crate) async fn delete_permanently(
        &self,
        access_token: &str,
        message_id: &str,
    ) -> Result<(), RemoteError> {
        let delete_url = format!("{}/{}", self.base_url, message_id);

        let response = self
            .client
            .delete(&delete_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    // Delete a message by moving it to trash
    pub(crate) async fn move_to_trash(
        &self,
        access_token: &str,
        message_id: &str,
    ) -> Result<(), RemoteError> {
        let trash_url = format!("{}/{}/trash", self.base_url, message_id);

        let response = self
            .client
            .post(&trash_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
