use sea_orm_migration::prelude::*;
use serde_json::json;

use crate::collections::{find_collection_by_name_or_id, save, unmarshal};

/// weddingcakeinquiry 集合的稳定 id，由平台在建集合时分配。
const WEDDING_CAKE_INQUIRY: &str = "pbc_2066101974";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let mut collection = find_collection_by_name_or_id(db, WEDDING_CAKE_INQUIRY).await?;

        // 开放创建：空字符串规则表示无条件允许创建记录
        unmarshal(&json!({ "createRule": "" }), &mut collection)?;

        save(db, &collection).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let mut collection = find_collection_by_name_or_id(db, WEDDING_CAKE_INQUIRY).await?;

        // 回滚：去掉显式规则，恢复平台默认
        unmarshal(&json!({ "createRule": null }), &mut collection)?;

        save(db, &collection).await
    }
}
