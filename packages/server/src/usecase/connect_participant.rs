//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 接続のアップグレード前に行う定員チェック
//!
//! ### なぜこのテストが必要か
//! - 満員のルームへの接続は WebSocket にアップグレードする前に 403 で断りたい
//! - ここでのチェックは参考値であり、最終的な判定はルーム自身が行う
//!
//! ### どのような状況を想定しているか
//! - 正常系：ルームが存在しない、または空きがある
//! - 異常系：ルームが満員

use std::sync::Arc;

use crate::domain::{Identity, RoomDirectory};

use super::error::ConnectError;

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    directory: Arc<dyn RoomDirectory>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(directory: Arc<dyn RoomDirectory>) -> Self {
        Self { directory }
    }

    /// 接続前の定員チェックを実行
    ///
    /// # Arguments
    ///
    /// * `identity` - 接続しようとしている参加者
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 接続を受け付けてよい
    /// * `Err(ConnectError::RoomFull)` - ルームのスナップショットが満員
    pub async fn execute(&self, identity: &Identity) -> Result<(), ConnectError> {
        let Some(snapshot) = self.directory.room_snapshot(&identity.project_id).await else {
            return Ok(());
        };

        if snapshot.is_full() {
            return Err(ConnectError::RoomFull {
                project_id: identity.project_id.to_string(),
                capacity: snapshot.max_users,
            });
        }

        Ok(())
    }
}
