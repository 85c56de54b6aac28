use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Installations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Installations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Installations::Name).string().not_null())
                    .col(ColumnDef::new(Installations::Location).text())
                    .col(
                        ColumnDef::new(Installations::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sensors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Sensors::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Sensors::InstallationId).integer().not_null())
                    .col(ColumnDef::new(Sensors::Name).string().not_null())
                    .col(ColumnDef::new(Sensors::MeasurementType).string().not_null())
                    .col(
                        ColumnDef::new(Sensors::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Sensors::CreatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sensors_installation")
                            .from(Sensors::Table, Sensors::InstallationId)
                            .to(Installations::Table, Installations::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sensors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Installations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Installations {
    Table,
    Id,
    Name,
    Location,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Sensors {
    Table,
    Id,
    InstallationId,
    Name,
    MeasurementType,
    Active,
    CreatedAt,
}
