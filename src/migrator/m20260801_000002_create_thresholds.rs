use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Thresholds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Thresholds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Thresholds::SensorId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Thresholds::MinValue).double())
                    .col(ColumnDef::new(Thresholds::MaxValue).double())
                    .col(ColumnDef::new(Thresholds::OptimalValue).double())
                    .col(
                        ColumnDef::new(Thresholds::AlertLevel)
                            .string()
                            .not_null()
                            .default("warning"),
                    )
                    .col(
                        ColumnDef::new(Thresholds::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Thresholds::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Thresholds::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_thresholds_sensor")
                            .from(Thresholds::Table, Thresholds::SensorId)
                            .to(Sensors::Table, Sensors::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DefaultThresholds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DefaultThresholds::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DefaultThresholds::MeasurementType)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(DefaultThresholds::MinValue).double())
                    .col(ColumnDef::new(DefaultThresholds::MaxValue).double())
                    .col(ColumnDef::new(DefaultThresholds::OptimalValue).double())
                    .col(ColumnDef::new(DefaultThresholds::Description).text())
                    .to_owned(),
            )
            .await?;

        // Recommended bounds for the common water-quality parameters.
        let insert = Query::insert()
            .into_table(DefaultThresholds::Table)
            .columns([
                DefaultThresholds::MeasurementType,
                DefaultThresholds::MinValue,
                DefaultThresholds::MaxValue,
                DefaultThresholds::OptimalValue,
                DefaultThresholds::Description,
            ])
            .values_panic([
                "dissolved_oxygen".into(),
                5.0.into(),
                12.0.into(),
                7.5.into(),
                "Dissolved oxygen in mg/L".into(),
            ])
            .values_panic([
                "temperature".into(),
                18.0.into(),
                30.0.into(),
                26.0.into(),
                "Water temperature in °C".into(),
            ])
            .values_panic([
                "ph".into(),
                6.5.into(),
                9.0.into(),
                7.5.into(),
                "pH of the water column".into(),
            ])
            .to_owned();
        manager.exec_stmt(insert).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DefaultThresholds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Thresholds::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Thresholds {
    Table,
    Id,
    SensorId,
    MinValue,
    MaxValue,
    OptimalValue,
    AlertLevel,
    Active,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DefaultThresholds {
    Table,
    Id,
    MeasurementType,
    MinValue,
    MaxValue,
    OptimalValue,
    Description,
}

#[derive(DeriveIden)]
enum Sensors {
    Table,
    Id,
}
