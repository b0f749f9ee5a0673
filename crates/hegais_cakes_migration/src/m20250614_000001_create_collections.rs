use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建集合目录表
        manager
            .create_table(
                Table::create()
                    .table(Collections::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Collections::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Collections::System)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Collections::Type).string().not_null())
                    .col(ColumnDef::new(Collections::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Collections::ListRule).text().null())
                    .col(ColumnDef::new(Collections::ViewRule).text().null())
                    .col(ColumnDef::new(Collections::CreateRule).text().null())
                    .col(ColumnDef::new(Collections::UpdateRule).text().null())
                    .col(ColumnDef::new(Collections::DeleteRule).text().null())
                    .col(
                        ColumnDef::new(Collections::Created)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Collections::Updated)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 登记店铺后端用到的全部集合，访问规则一律从平台默认开始
        let db = manager.get_connection();
        seed_collection(db, "pbc_1687431203", "TasterBoxInquiry").await?;
        seed_collection(db, "pbc_3302557580", "bespokecakeinquiry").await?;
        seed_collection(db, "pbc_2066101974", "weddingcakeinquiry").await?;
        seed_collection(db, "pbc_2478702389", "workshopbooking").await?;
        seed_collection(db, "pbc_4275539003", "cart").await?;
        seed_collection(db, "pbc_1110206208", "payment").await?;
        seed_collection(db, "pbc_3607937828", "Shop").await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Collections::Table).to_owned())
            .await
    }
}

async fn seed_collection<C: ConnectionTrait>(db: &C, id: &str, name: &str) -> Result<(), DbErr> {
    let stmt = Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR IGNORE INTO collections (id, type, name) VALUES (?, 'base', ?)",
        vec![id.into(), name.into()],
    );
    db.execute(stmt).await?;
    Ok(())
}

#[derive(DeriveIden)]
enum Collections {
    Table,
    Id,
    System,
    Type,
    Name,
    ListRule,
    ViewRule,
    CreateRule,
    UpdateRule,
    DeleteRule,
    Created,
    Updated,
}
