use crate::auth::hash_password;
use crate::models::{storage, storage_box, user};
use sea_orm::*;

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Idempotent: skip when facilities are already present
    if storage::Entity::find().count(db).await? > 0 {
        tracing::debug!("Demo data already present, skipping seed");
        return Ok(());
    }

    // 1. Create Facilities
    let storages = vec![
        ("Moscow", "15 Rokotova st.", 17.5, "storages/moscow.jpg"),
        ("Odintsovo", "36 Severnaya st.", 18.0, "storages/odintsovo.jpg"),
        ("Pushkino", "5 Stroiteley st.", 20.0, "storages/pushkino.jpg"),
        ("Lyubertsy", "88 Sovetskaya st.", 18.0, "storages/lyubertsy.jpg"),
        ("Domodedovo", "29 Ordzhonikidze st.", 21.0, "storages/domodedovo.jpg"),
    ];

    let mut storage_ids = Vec::new();

    for (city, address, temperature, photo) in storages {
        let storage = storage::ActiveModel {
            city: Set(city.to_owned()),
            address: Set(address.to_owned()),
            temperature: Set(temperature),
            contact: Set(Some("+7 495 000-00-00".to_owned())),
            description: Set(Some(format!("Heated self-storage facility in {}", city))),
            directions: Set(None),
            photo: Set(Some(photo.to_owned())),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        let res = storage::Entity::insert(storage).exec(db).await?;
        storage_ids.push(res.last_insert_id);
    }

    // 2. Create Boxes in three sizes on three levels per facility
    for storage_id in storage_ids {
        let mut number = 1;
        for level in 1..=3 {
            for (height, width, length, monthly_price) in [
                (2.0, 1.5, 2.0, 2300.0),
                (2.5, 2.0, 2.5, 3500.0),
                (2.5, 2.4, 4.0, 5200.0),
            ] {
                let bx = storage_box::ActiveModel {
                    number: Set(format!("{}-{:03}", storage_id, number)),
                    storage_id: Set(storage_id),
                    level: Set(level),
                    height: Set(height),
                    width: Set(width),
                    length: Set(length),
                    area: Set(width * length),
                    monthly_price: Set(monthly_price),
                    is_occupied: Set(false),
                    created_at: Set(chrono::Utc::now().to_rfc3339()),
                    updated_at: Set(chrono::Utc::now().to_rfc3339()),
                    ..Default::default()
                };
                storage_box::Entity::insert(bx).exec(db).await?;
                number += 1;
            }
        }
    }

    // 3. Create a demo user
    let password_hash = hash_password("demo1234").map_err(DbErr::Custom)?;

    let demo_user = user::ActiveModel {
        username: Set("demo".to_owned()),
        email: Set("demo@selfstorage.example".to_owned()),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        updated_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    match user::Entity::insert(demo_user)
        .on_conflict(
            sea_orm::sea_query::OnConflict::column(user::Column::Email)
                .do_nothing()
                .to_owned(),
        )
        .exec(db)
        .await
    {
        // The conflict path means a demo user already exists
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}
