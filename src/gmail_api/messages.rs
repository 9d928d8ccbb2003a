use super::{check_status, GmailClient};
use crate::error::RemoteError;
use crate::types::{Header, Message, MessagesResponse};

impl GmailClient {
    // One listing call; the provider may return fewer ids than requested
    pub(crate) async fn fetch_message_ids(
        &self,
        access_token: &str,
        limit: usize,
    ) -> Result<Vec<String>, RemoteError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("maxResults", limit.to_string())])
            .bearer_auth(access_token)
            .send()
            .await?;

        let messages_data: MessagesResponse = check_status(response).await?.json().await?;
        Ok(messages_data
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|m| m.id)
            .take(limit)
            .collect())
    }

    // Use metadata format so only the requested headers come back
    pub(crate) async fn fetch_metadata(
        &self,
        access_token: &str,
        id: &str,
        header_names: &[&'static str],
    ) -> Result<Vec<Header>, RemoteError> {
        let message_url = format!("{}/{}", self.base_url, id);
        let mut query: Vec<(&str, &str)> = vec![("format", "metadata")];
        query.extend(header_names.iter().map(|name| ("metadataHeaders", *name)));

        let response = self
            .client
            .get(&message_url)
            .query(&query)
            .bearer_auth(access_token)
            .send()
            .await?;

        let message: Message = check_status(response).await?.json().await?;
        Ok(message
            .payload
            .and_then(|payload| payload.headers)
            .unwrap_or_default())
    }
}
