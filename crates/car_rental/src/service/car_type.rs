use car_rental_entity::{car, car_type};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;

use crate::error::{ServiceError, ServiceResult};
use crate::utils::validation::required_text;

pub async fn list_car_types<C: ConnectionTrait>(db: &C) -> ServiceResult<Vec<car_type::Model>> {
    Ok(car_type::Entity::find()
        .order_by_asc(car_type::Column::Name)
        .all(db)
        .await?)
}

pub async fn find_car_type<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<car_type::Model> {
    car_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("car type", id))
}

/// 名称去除空白后必须唯一，except 为正在编辑的类型
async fn ensure_unique_name<C: ConnectionTrait>(db: &C, name: &str, except: Option<i32>) -> ServiceResult<()> {
    let mut query = car_type::Entity::find().filter(car_type::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(car_type::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ServiceError::Conflict(format!("Car type '{name}' already exists")));
    }
    Ok(())
}

pub async fn create_car_type<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: &str,
) -> ServiceResult<car_type::Model> {
    let name = required_text("Type name", name, 50)?;
    ensure_unique_name(db, &name, None).await?;
    let created = car_type::ActiveModel {
        name: Set(name),
        description: Set(description.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("新增车辆类型 {} ({})", created.name, created.id);
    Ok(created)
}

pub async fn update_car_type<C: ConnectionTrait>(
    db: &C,
    id: i32,
    name: &str,
    description: &str,
) -> ServiceResult<car_type::Model> {
    let existing = find_car_type(db, id).await?;
    let name = required_text("Type name", name, 50)?;
    ensure_unique_name(db, &name, Some(id)).await?;
    let mut model = existing.into_active_model();
    model.name = Set(name);
    model.description = Set(description.trim().to_string());
    Ok(model.update(db).await?)
}

pub async fn delete_car_type<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<()> {
    let existing = find_car_type(db, id).await?;
    let used_by = car::Entity::find()
        .filter(car::Column::CarTypeId.eq(id))
        .count(db)
        .await?;
    if used_by > 0 {
        return Err(ServiceError::Conflict(
            "Cannot delete a car type that is used by cars".to_string(),
        ));
    }
    car_type::Entity::delete_by_id(id).exec(db).await?;
    info!("删除车辆类型 {} ({})", existing.name, existing.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn test_car_type_crud() {
        let fx = Fixture::new().await;
        let van = create_car_type(&fx.db, "  Van ", "Cargo").await.unwrap();
        assert_eq!(van.name, "Van");
        create_car_type(&fx.db, "Coupe", "").await.unwrap();

        let names: Vec<_> = list_car_types(&fx.db).await.unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Coupe", "Van"]);

        assert_matches!(create_car_type(&fx.db, "Van", "").await, Err(ServiceError::Conflict(_)));
        assert_matches!(create_car_type(&fx.db, "   ", "").await, Err(ServiceError::Validation(_)));

        // 保持原名称不算重复
        let renamed = update_car_type(&fx.db, van.id, "Van", "Big cargo").await.unwrap();
        assert_eq!(renamed.description, "Big cargo");
        assert_matches!(
            update_car_type(&fx.db, van.id, "Coupe", "").await,
            Err(ServiceError::Conflict(_))
        );
        assert_matches!(
            update_car_type(&fx.db, 999, "Truck", "").await,
            Err(ServiceError::NotFound { entity: "car type", .. })
        );
    }

    #[tokio::test]
    async fn test_delete_car_type_in_use() {
        let fx = Fixture::new().await;
        let car = fx.car("Kia", "Rio", 2021, "800").await;
        assert_matches!(
            delete_car_type(&fx.db, car.car_type_id).await,
            Err(ServiceError::Conflict(_))
        );

        let unused = create_car_type(&fx.db, "Pickup", "").await.unwrap();
        delete_car_type(&fx.db, unused.id).await.unwrap();
        assert_matches!(find_car_type(&fx.db, unused.id).await, Err(ServiceError::NotFound { .. }));
    }
}
