use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alerts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Alerts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Alerts::InstallationId).integer().not_null())
                    .col(ColumnDef::new(Alerts::SensorId).integer())
                    .col(ColumnDef::new(Alerts::AlertType).string().not_null())
                    .col(ColumnDef::new(Alerts::Message).text().not_null())
                    .col(ColumnDef::new(Alerts::Severity).string().not_null())
                    .col(ColumnDef::new(Alerts::RecordedValue).double())
                    .col(
                        ColumnDef::new(Alerts::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alerts::Attended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alerts::Resolved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alerts::Metadata).json())
                    .col(ColumnDef::new(Alerts::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Alerts::ResolvedAt).date_time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_installation")
                            .from(Alerts::Table, Alerts::InstallationId)
                            .to(Installations::Table, Installations::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_alerts_sensor")
                            .from(Alerts::Table, Alerts::SensorId)
                            .to(Sensors::Table, Sensors::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_installation_created")
                    .table(Alerts::Table)
                    .col(Alerts::InstallationId)
                    .col(Alerts::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // The evaluator's open-alert de-dup lookup hits this one.
        manager
            .create_index(
                Index::create()
                    .name("idx_alerts_sensor_resolved")
                    .table(Alerts::Table)
                    .col(Alerts::SensorId)
                    .col(Alerts::Resolved)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alerts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Alerts {
    Table,
    Id,
    InstallationId,
    SensorId,
    AlertType,
    Message,
    Severity,
    RecordedValue,
    Read,
    Attended,
    Resolved,
    Metadata,
    CreatedAt,
    ResolvedAt,
}

#[derive(DeriveIden)]
enum Installations {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Sensors {
    Table,
    Id,
}
