//! UseCase: 参加者の強制退出処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - KickParticipantUseCase::execute() メソッド
//! - kicked 通知の配信と強制的な登録解除の順序
//!
//! ### なぜこのテストが必要か
//! - kicked 通知はルームのメールボックスに登録解除より先に積まれる必要がある
//!   （同じメールボックスなので、対象者自身も通知を受け取ってから切断される）
//! - 存在しないルーム・ユーザーに対しては何もせずにエラーを返す
//!
//! ### どのような状況を想定しているか
//! - 正常系：接続中のユーザーを退出させる（管理者 ID あり）
//! - 異常系：ルームが存在しない、ユーザーが接続していない

use std::sync::Arc;

use tracing::info;

use crate::domain::{Identity, Member, Message, ProjectId, RoomDirectory, UserId};

use super::error::KickError;

/// 参加者強制退出のユースケース
pub struct KickParticipantUseCase {
    directory: Arc<dyn RoomDirectory>,
}

impl KickParticipantUseCase {
    /// 新しい KickParticipantUseCase を作成
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// 強制退出を実行
    ///
    /// 同じユーザー ID の接続が複数ある場合は、すべて退出させる。
    ///
    /// # Arguments
    ///
    /// * `project_id` - 対象のプロジェクト
    /// * `user_id` - 退出させるユーザー
    /// * `admin` - 操作した管理者（任意）
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Member>)` - 退出させたメンバー
    /// * `Err(KickError)` - ルームまたはユーザーが見つからない
    pub async fn execute(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        admin: Option<UserId>,
    ) -> Result<Vec<Member>, KickError> {
        let snapshot = self
            .directory
            .room_snapshot(project_id)
            .await
            .ok_or_else(|| KickError::RoomNotFound(project_id.to_string()))?;

        let Some(target) = snapshot.find_user(user_id) else {
            return Err(KickError::UserNotFound {
                project_id: project_id.to_string(),
                user_id: user_id.to_string(),
            });
        };

        // 1. 全員（対象者を含む）に kicked を通知
        let identity = Identity::new(
            project_id.clone(),
            target.user_id.clone(),
            target.username.clone(),
        );
        self.directory
            .send_to_room(project_id, Message::kicked(identity, admin.clone()))
            .await
            .map_err(|_| KickError::RoomNotFound(project_id.to_string()))?;

        // 2. 通知の後に登録解除を送る
        let kicked: Vec<Member> = snapshot
            .members
            .iter()
            .filter(|member| &member.user_id == user_id)
            .cloned()
            .collect();
        for member in &kicked {
            self.directory.unregister(project_id, member.connection_id);
        }

        info!(
            %project_id,
            %user_id,
            admin = admin.as_ref().map(UserId::as_str).unwrap_or("-"),
            connections = kicked.len(),
            "user kicked from room"
        );
        Ok(kicked)
    }
}

#[cfg(test)]
mod tests {
    use mockall::Sequence;

    use super::*;
    use crate::domain::{
        ConnectionId, MessageKind, MockRoomDirectory, RoomSnapshot, Timestamp, Username,
    };

    fn project() -> ProjectId {
        ProjectId::new("P1".to_string()).unwrap()
    }

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    fn member(id: &str) -> Member {
        Member {
            connection_id: ConnectionId::generate(),
            user_id: user(id),
            username: Username::new(id.to_uppercase()).unwrap(),
            joined_at: Timestamp::new(0),
        }
    }

    #[tokio::test]
    async fn test_kick_notifies_then_unregisters() {
        // テスト項目: kicked 通知の後に対象の接続が登録解除される
        // given (前提条件):
        let alice = member("alice");
        let bob = member("bob");
        let bob_connection = bob.connection_id;
        let snapshot = RoomSnapshot {
            project_id: project(),
            max_users: 4,
            members: vec![alice, bob],
        };

        let mut seq = Sequence::new();
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_room_snapshot()
            .returning(move |_| Some(snapshot.clone()));
        directory
            .expect_send_to_room()
            .withf(|_, message| {
                matches!(
                    &message.kind,
                    MessageKind::Kicked { admin: Some(admin), .. } if admin.as_str() == "root"
                ) && message.identity.as_ref().map(|i| i.user_id.as_str()) == Some("bob")
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        directory
            .expect_unregister()
            .withf(move |project_id, connection_id| {
                project_id.as_str() == "P1" && *connection_id == bob_connection
            })
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        let usecase = KickParticipantUseCase::new(Arc::new(directory));

        // when (操作):
        let result = usecase
            .execute(&project(), &user("bob"), Some(user("root")))
            .await;

        // then (期待する結果):
        let kicked = result.unwrap();
        assert_eq!(kicked.len(), 1);
        assert_eq!(kicked[0].user_id.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_kick_room_not_found() {
        // テスト項目: ルームが存在しない場合は RoomNotFound エラーになる
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_room_snapshot().returning(|_| None);
        directory.expect_send_to_room().never();
        directory.expect_unregister().never();
        let usecase = KickParticipantUseCase::new(Arc::new(directory));

        // when (操作):
        let result = usecase.execute(&project(), &user("bob"), None).await;

        // then (期待する結果):
        assert_eq!(result, Err(KickError::RoomNotFound("P1".to_string())));
    }

    #[tokio::test]
    async fn test_kick_user_not_found() {
        // テスト項目: 接続していないユーザーは UserNotFound エラーになる
        // given (前提条件):
        let snapshot = RoomSnapshot {
            project_id: project(),
            max_users: 4,
            members: vec![member("alice")],
        };
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_room_snapshot()
            .returning(move |_| Some(snapshot.clone()));
        directory.expect_send_to_room().never();
        directory.expect_unregister().never();
        let usecase = KickParticipantUseCase::new(Arc::new(directory));

        // when (操作):
        let result = usecase.execute(&project(), &user("bob"), None).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(KickError::UserNotFound {
                project_id: "P1".to_string(),
                user_id: "bob".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_kick_removes_every_connection_of_user() {
        // テスト項目: 同じユーザーの複数接続はすべて退出させられる
        // given (前提条件):
        let snapshot = RoomSnapshot {
            project_id: project(),
            max_users: 4,
            members: vec![member("bob"), member("alice"), member("bob")],
        };
        let mut directory = MockRoomDirectory::new();
        directory
            .expect_room_snapshot()
            .returning(move |_| Some(snapshot.clone()));
        directory
            .expect_send_to_room()
            .times(1)
            .returning(|_, _| Ok(()));
        directory.expect_unregister().times(2).return_const(());
        let usecase = KickParticipantUseCase::new(Arc::new(directory));

        // when (操作):
        let result = usecase.execute(&project(), &user("bob"), None).await;

        // then (期待する結果):
        assert_eq!(result.unwrap().len(), 2);
    }
}
