//! UseCase: ルーム情報の参照

use std::sync::Arc;

use crate::domain::{ProjectId, RoomDirectory, RoomSnapshot};

/// ルーム参照のユースケース
pub struct QueryRoomsUseCase {
    directory: Arc<dyn RoomDirectory>,
}

impl QueryRoomsUseCase {
    /// 新しい QueryRoomsUseCase を作成
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// 指定プロジェクトのルーム情報を取得
    ///
    /// ルームが存在しない場合は、参加者 0 人・既定の定員のスナップショットを返す。
    pub async fn room(&self, project_id: ProjectId) -> RoomSnapshot {
        match self.directory.room_snapshot(&project_id).await {
            Some(snapshot) => snapshot,
            None => RoomSnapshot::empty(project_id, self.directory.capacity()),
        }
    }

    /// 稼働中の全ルームを取得
    pub async fn list(&self) -> Vec<RoomSnapshot> {
        self.directory.list_rooms().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MockRoomDirectory;

    fn project(id: &str) -> ProjectId {
        ProjectId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_room_absent_reports_empty_with_capacity() {
        // テスト項目: 存在しないルームは参加者 0 人・定員付きで返される
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_room_snapshot().returning(|_| None);
        directory.expect_capacity().return_const(4usize);
        let usecase = QueryRoomsUseCase::new(Arc::new(directory));

        // when (操作):
        let snapshot = usecase.room(project("P1")).await;

        // then (期待する結果):
        assert_eq!(snapshot.project_id, project("P1"));
        assert_eq!(snapshot.users_count(), 0);
        assert_eq!(snapshot.max_users, 4);
        assert!(!snapshot.is_full());
    }

    #[tokio::test]
    async fn test_list_returns_directory_rooms() {
        // テスト項目: 稼働中のルーム一覧がそのまま返される
        // given (前提条件):
        let mut directory = MockRoomDirectory::new();
        directory.expect_list_rooms().returning(|| {
            vec![
                RoomSnapshot::empty(ProjectId::new("A".to_string()).unwrap(), 4),
                RoomSnapshot::empty(ProjectId::new("B".to_string()).unwrap(), 4),
            ]
        });
        let usecase = QueryRoomsUseCase::new(Arc::new(directory));

        // when (操作):
        let rooms = usecase.list().await;

        // then (期待する結果):
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[1].project_id.as_str(), "B");
    }
}
