// src/steam/friends.rs
// =============================================================================
// Friend lists: the adjacency function the crawler walks.
//
// Example response:
//   {"friendslist": {"friends": [
//       {"steamid": "76561197960265731", "relationship": "friend", "friend_since": 0}
//   ]}}
//
// Private profiles come back as HTTP 401; a body without "friendslist" is
// treated the same as an empty list.
// =============================================================================

use async_trait::async_trait;
use serde::Deserialize;

use super::SteamClient;
use crate::crawl::FriendSource;
use crate::errors::FetchError;

#[derive(Debug, Deserialize)]
struct FriendListResponse {
    friendslist: Option<FriendList>,
}

#[derive(Debug, Deserialize)]
struct FriendList {
    #[serde(default)]
    friends: Vec<Friend>,
}

#[derive(Debug, Deserialize)]
struct Friend {
    steamid: String,
}

impl SteamClient {
    /// Steam IDs of everyone on `steam_id`'s friend list, in API order.
    pub async fn friend_list(&self, steam_id: &str) -> Result<Vec<String>, FetchError> {
        let url = self.api_url(
            "ISteamUser/GetFriendList/v1/",
            &[("steamid", steam_id), ("relationship", "friend")],
        )?;
        let body = self.get_text(url).await?;
        parse_friend_list(&body)
    }
}

#[async_trait]
impl FriendSource for SteamClient {
    async fn friends_of(&self, steam_id: &str) -> Result<Vec<String>, FetchError> {
        self.friend_list(steam_id).await
    }
}

fn parse_friend_list(body: &str) -> Result<Vec<String>, FetchError> {
    let response: FriendListResponse = serde_json::from_str(body)?;

    Ok(response
        .friendslist
        .map(|list| list.friends.into_iter().map(|f| f.steamid).collect())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_friend_list_keeps_order() {
        let body = r#"{"friendslist":{"friends":[
            {"steamid":"3","relationship":"friend","friend_since":1},
            {"steamid":"1","relationship":"friend","friend_since":2},
            {"steamid":"2","relationship":"friend","friend_since":3}
        ]}}"#;

        assert_eq!(parse_friend_list(body).unwrap(), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_missing_friendslist_is_empty() {
        assert!(parse_friend_list("{}").unwrap().is_empty());
        assert!(parse_friend_list(r#"{"friendslist":{}}"#).unwrap().is_empty());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = parse_friend_list("<html>401 Unauthorized</html>").unwrap_err();
        assert!(matches!(err, FetchError::MalformedPayload(_)));
    }
}
