use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let statement = r#"
        create type "user_role" as enum ('DISPATCH', 'DRIVER', 'CLEANING_STAFF');

        create type "vehicle_status" as enum ('AVAILABLE', 'IN_USE', 'MAINTENANCE', 'OUT_OF_SERVICE');

        create type "key_status" as enum ('AVAILABLE', 'CHECKED_OUT', 'MAINTENANCE', 'LOST');

        create type "transaction_status" as enum ('CHECKED_OUT', 'CHECKED_IN');

        create type "vehicle_condition" as enum ('GOOD', 'MINOR_DAMAGE', 'MAJOR_DAMAGE', 'ACCIDENT');

        create table "user" (
            "id" serial primary key,
            "created_at" timestamptz(0) not null default now(),
            "employee_id" varchar(255) not null,
            "full_name" varchar(255) not null,
            "role" user_role not null,
            "dispatch_id" varchar(255) null,
            "license_last4" varchar(4) null,
            "pin_hash" varchar(255) not null,
            "is_active" boolean not null default true
        );

        alter table
            "user"
        add
            constraint "user_employee_id_unique" unique ("employee_id");

        alter table
            "user"
        add
            constraint "user_dispatch_id_unique" unique ("dispatch_id");

        alter table
            "user"
        add
            constraint "user_license_last4_unique" unique ("license_last4");

        create table "vehicle" (
            "id" serial primary key,
            "created_at" timestamptz(0) not null default now(),
            "unit_number" varchar(255) not null,
            "plate_number" varchar(255) not null,
            "vehicle_type" varchar(255) not null,
            "brand" varchar(255) not null,
            "model" varchar(255) not null,
            "year" smallint not null,
            "color" varchar(255) null,
            "additional_info" text null,
            "status" vehicle_status not null default 'AVAILABLE'
        );

        alter table
            "vehicle"
        add
            constraint "vehicle_unit_number_unique" unique ("unit_number");

        alter table
            "vehicle"
        add
            constraint "vehicle_plate_number_unique" unique ("plate_number");

        create table "vehicle_key" (
            "id" serial primary key,
            "created_at" timestamptz(0) not null default now(),
            "key_number" varchar(255) not null,
            "vehicle_id" int not null,
            "location" varchar(255) not null,
            "notes" text null,
            "status" key_status not null default 'AVAILABLE'
        );

        comment on column "vehicle_key"."key_number" is 'number printed on the key tag, stored uppercase';

        alter table
            "vehicle_key"
        add
            constraint "vehicle_key_key_number_unique" unique ("key_number");

        alter table
            "vehicle_key"
        add
            constraint "vehicle_key_vehicle_id_foreign" foreign key ("vehicle_id") references "vehicle" ("id");

        create table "key_transaction" (
            "id" serial primary key,
            "key_id" int not null,
            "user_id" int not null,
            "status" transaction_status not null,
            "checkout_time" timestamptz(0) not null,
            "checkin_time" timestamptz(0) null,
            "vehicle_condition" vehicle_condition null,
            "incident_report" text null
        );

        alter table
            "key_transaction"
        add
            constraint "key_transaction_key_id_foreign" foreign key ("key_id") references "vehicle_key" ("id");

        alter table
            "key_transaction"
        add
            constraint "key_transaction_user_id_foreign" foreign key ("user_id") references "user" ("id");

        create index "key_transaction_key_id_status_index" on "key_transaction" ("key_id", "status");

        create index "key_transaction_user_id_status_index" on "key_transaction" ("user_id", "status");

        create table "session" (
            "public_id" serial not null,
            "session_token" bytea not null,
            "created_at" timestamptz(0) not null default now(),
            "expires_at" timestamptz(0) not null,
            "user_agent" varchar(255) not null,
            "ip" varchar(64) not null,
            "user_id" int not null,
            constraint "session_pkey" primary key ("session_token")
        );

        alter table
            "session"
        add
            constraint "session_public_id_unique" unique ("public_id");

        alter table
            "session"
        add
            constraint "session_user_id_foreign" foreign key ("user_id") references "user" ("id") on delete cascade;
        "#;

        db.execute_unprepared(statement).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        let statement = r#"
        drop table "session";
        drop table "key_transaction";
        drop table "vehicle_key";
        drop table "vehicle";
        drop table "user";

        drop type "vehicle_condition";
        drop type "transaction_status";
        drop type "key_status";
        drop type "vehicle_status";
        drop type "user_role";
        "#;

        db.execute_unprepared(statement).await?;

        Ok(())
    }
}
