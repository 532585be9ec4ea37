//! UseCase: HTTP 経由のメッセージ送信処理
//!
//! WebSocket を持たないサーバー側のコンポーネントが、ルームへメッセージを
//! 配信するための入口。メッセージはルームのメールボックスに積まれるだけで、
//! 配信の完了は待たない。

use std::sync::Arc;

use serde_json::Value;

use crate::domain::{Identity, Message, RoomDirectory, RoomError};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    directory: Arc<dyn RoomDirectory>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `kind` - メッセージの種類（`type` フィールド）
    /// * `data` - 任意のペイロード
    /// * `author` - 送信者として記録する識別情報
    pub async fn execute(
        &self,
        kind: String,
        data: Value,
        author: Identity,
    ) -> Result<(), SendMessageError> {
        let project_id = author.project_id.clone();
        let message = Message::relay(kind, data, author);

        self.directory
            .send_to_room(&project_id, message)
            .await
            .map_err(|RoomError::NotFound(project_id)| SendMessageError::RoomNotFound(project_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MessageKind, MockRoomDirectory, ProjectId, UserId, Username};

    fn author() -> Identity {
        Identity::new(
            ProjectId::new("P1".to_string()).unwrap(),
            UserId::new("system".to_string()).unwrap(),
            Username::new("System".to_string()).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_send_message_success() {
        // テスト項目: メッセージが送信者の識別情報付きでルームに渡される
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_send_to_room()
            .withf(|project_id, message| {
                project_id.as_str() == "P1"
                    && message.identity.as_ref().map(|i| i.user_id.as_str()) == Some("system")
                    && matches!(&message.kind, MessageKind::Relay { kind, .. } if kind == "notice")
            })
            .times(1)
            .returning(|_, _| Ok(()));
        let usecase = SendMessageUseCase::new(Arc::new(directory));

        // when (操作):
        let result = usecase
            .execute("notice".to_string(), serde_json::json!({"text": "deploy"}), author())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_message_room_not_found() {
        // テスト項目: ルームが存在しない場合は RoomNotFound エラーになる
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_send_to_room()
            .returning(|project_id, _| Err(RoomError::NotFound(project_id.to_string())));
        let usecase = SendMessageUseCase::new(Arc::new(directory));

        // when (操作):
        let result = usecase
            .execute("notice".to_string(), Value::Null, author())
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(SendMessageError::RoomNotFound("P1".to_string())));
    }
}
