use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 集合目录中的一条集合定义。
/// 访问规则为 `None` 表示未设置显式规则（走平台默认，通常为拒绝），
/// 空字符串表示无条件允许。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: String,
    pub system: bool,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub list_rule: Option<String>,
    pub view_rule: Option<String>,
    pub create_rule: Option<String>,
    pub update_rule: Option<String>,
    pub delete_rule: Option<String>,
}

/// 按 id 或 name 查找集合，找不到时返回 `RecordNotFound`。
pub async fn find_collection_by_name_or_id<C: ConnectionTrait>(
    db: &C,
    name_or_id: &str,
) -> Result<Collection, DbErr> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "SELECT id, system, type, name, list_rule, view_rule, create_rule, update_rule, delete_rule \
         FROM collections WHERE id = ? OR name = ? LIMIT 1",
        vec![name_or_id.into(), name_or_id.into()],
    );
    let Some(row) = db.query_one(stmt).await? else {
        return Err(DbErr::RecordNotFound(format!("集合不存在: {}", name_or_id)));
    };

    Ok(Collection {
        id: row.try_get("", "id")?,
        system: row.try_get("", "system")?,
        kind: row.try_get("", "type")?,
        name: row.try_get("", "name")?,
        list_rule: row.try_get("", "list_rule")?,
        view_rule: row.try_get("", "view_rule")?,
        create_rule: row.try_get("", "create_rule")?,
        update_rule: row.try_get("", "update_rule")?,
        delete_rule: row.try_get("", "delete_rule")?,
    })
}

/// 把部分属性（JSON object）合并进集合定义，仅覆盖补丁中出现的字段。
/// 未知字段忽略，字段类型不匹配时报错且不修改集合。
pub fn unmarshal(patch: &Value, collection: &mut Collection) -> Result<(), DbErr> {
    let Value::Object(patch) = patch else {
        return Err(DbErr::Custom("集合补丁必须是 JSON object".to_string()));
    };

    let mut merged = match serde_json::to_value(&*collection) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => return Err(DbErr::Custom("集合应当序列化为 JSON object".to_string())),
        Err(e) => return Err(DbErr::Custom(format!("序列化集合失败: {}", e))),
    };
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }

    *collection = serde_json::from_value(Value::Object(merged))
        .map_err(|e| DbErr::Custom(format!("集合补丁不合法: {}", e)))?;
    Ok(())
}

/// 将修改后的集合定义写回目录；未命中任何行视为集合不存在。
pub async fn save<C: ConnectionTrait>(db: &C, collection: &Collection) -> Result<(), DbErr> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE collections SET system = ?, type = ?, name = ?, list_rule = ?, view_rule = ?, \
         create_rule = ?, update_rule = ?, delete_rule = ?, updated = CURRENT_TIMESTAMP \
         WHERE id = ?",
        vec![
            collection.system.into(),
            collection.kind.clone().into(),
            collection.name.clone().into(),
            collection.list_rule.clone().into(),
            collection.view_rule.clone().into(),
            collection.create_rule.clone().into(),
            collection.update_rule.clone().into(),
            collection.delete_rule.clone().into(),
            collection.id.clone().into(),
        ],
    );
    let result = db.execute(stmt).await?;
    if result.rows_affected() == 0 {
        return Err(DbErr::RecordNotFound(format!("集合不存在: {}", collection.id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use sea_orm::{Database, DatabaseConnection};
    use sea_orm_migration::{MigrationTrait, SchemaManager};
    use serde_json::json;

    use super::*;
    use crate::m20250614_000001_create_collections;

    fn inquiry() -> Collection {
        Collection {
            id: "pbc_2066101974".to_string(),
            system: false,
            kind: "base".to_string(),
            name: "weddingcakeinquiry".to_string(),
            list_rule: None,
            view_rule: Some("@request.auth.id != \"\"".to_string()),
            create_rule: None,
            update_rule: None,
            delete_rule: None,
        }
    }

    async fn catalog() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let manager = SchemaManager::new(&db);
        m20250614_000001_create_collections::Migration
            .up(&manager)
            .await
            .unwrap();
        db
    }

    #[test]
    fn unmarshal_overwrites_named_attribute_only() {
        let mut collection = inquiry();
        unmarshal(&json!({ "createRule": "" }), &mut collection).unwrap();
        assert_eq!(collection.create_rule, Some(String::new()));
        assert_eq!(collection.view_rule, inquiry().view_rule);
        assert_eq!(collection.name, "weddingcakeinquiry");
    }

    #[test]
    fn unmarshal_null_clears_rule() {
        let mut collection = inquiry();
        collection.create_rule = Some(String::new());
        unmarshal(&json!({ "createRule": null }), &mut collection).unwrap();
        assert_eq!(collection.create_rule, None);
    }

    #[test]
    fn unmarshal_ignores_unknown_attributes() {
        let mut collection = inquiry();
        unmarshal(&json!({ "indexes": [] }), &mut collection).unwrap();
        assert_eq!(collection, inquiry());
    }

    #[test]
    fn unmarshal_rejects_non_object_patch() {
        let mut collection = inquiry();
        assert!(unmarshal(&json!("createRule"), &mut collection).is_err());
    }

    #[test]
    fn unmarshal_rejects_mistyped_value() {
        let mut collection = inquiry();
        assert!(unmarshal(&json!({ "createRule": 42 }), &mut collection).is_err());
        // 失败时集合保持原样
        assert_eq!(collection, inquiry());
    }

    #[async_std::test]
    async fn find_resolves_by_id_and_by_name() {
        let db = catalog().await;
        let by_id = find_collection_by_name_or_id(&db, "pbc_2066101974").await.unwrap();
        let by_name = find_collection_by_name_or_id(&db, "weddingcakeinquiry")
            .await
            .unwrap();
        assert_eq!(by_id, by_name);
        assert_eq!(by_id.kind, "base");
    }

    #[async_std::test]
    async fn find_unknown_identifier_is_not_found() {
        let db = catalog().await;
        let err = find_collection_by_name_or_id(&db, "pbc_0000000000")
            .await
            .unwrap_err();
        assert!(matches!(err, DbErr::RecordNotFound(_)));
    }

    #[async_std::test]
    async fn save_persists_rule_changes() {
        let db = catalog().await;
        let mut collection = find_collection_by_name_or_id(&db, "cart").await.unwrap();
        unmarshal(&json!({ "createRule": "@request.auth.id != \"\"" }), &mut collection).unwrap();
        save(&db, &collection).await.unwrap();

        let reloaded = find_collection_by_name_or_id(&db, "cart").await.unwrap();
        assert_eq!(reloaded.create_rule, Some("@request.auth.id != \"\"".to_string()));
    }

    #[async_std::test]
    async fn save_unknown_collection_is_not_found() {
        let db = catalog().await;
        let mut collection = find_collection_by_name_or_id(&db, "cart").await.unwrap();
        collection.id = "pbc_0000000000".to_string();
        let err = save(&db, &collection).await.unwrap_err();
        assert!(matches!(err, DbErr::RecordNotFound(_)));
    }
}
