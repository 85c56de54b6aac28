use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduleRules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleRules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ScheduleRules::InstallationId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleRules::Name).string().not_null())
                    .col(
                        ColumnDef::new(ScheduleRules::Kind)
                            .string()
                            .not_null()
                            .default("time_window"),
                    )
                    .col(ColumnDef::new(ScheduleRules::StartTime).time())
                    .col(ColumnDef::new(ScheduleRules::EndTime).time())
                    .col(
                        ColumnDef::new(ScheduleRules::CrossesMidnight)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ScheduleRules::ConditionSensorId).integer())
                    .col(ColumnDef::new(ScheduleRules::ConditionMin).double())
                    .col(ColumnDef::new(ScheduleRules::ConditionMax).double())
                    .col(ColumnDef::new(ScheduleRules::DurationMinutes).integer())
                    .col(ColumnDef::new(ScheduleRules::Action).string().not_null())
                    .col(
                        ColumnDef::new(ScheduleRules::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ScheduleRules::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_rules_installation")
                            .from(ScheduleRules::Table, ScheduleRules::InstallationId)
                            .to(Installations::Table, Installations::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_rules_condition_sensor")
                            .from(ScheduleRules::Table, ScheduleRules::ConditionSensorId)
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
                    .name("idx_schedule_rules_installation_active")
                    .table(ScheduleRules::Table)
                    .col(ScheduleRules::InstallationId)
                    .col(ScheduleRules::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleRules::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScheduleRules {
    Table,
    Id,
    InstallationId,
    Name,
    Kind,
    StartTime,
    EndTime,
    CrossesMidnight,
    ConditionSensorId,
    ConditionMin,
    ConditionMax,
    DurationMinutes,
    Action,
    Active,
    CreatedAt,
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
