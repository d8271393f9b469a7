//! 账号、客户资料与登录校验

use car_rental_entity::{client_profile, rental, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::config::RentalPolicy;
use crate::error::{ServiceError, ServiceResult};
use crate::utils::time_format::now_standard_string;
use crate::utils::validation::{is_valid_email, required_text};

#[derive(Debug, Clone)]
pub struct RegisterClient {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub full_name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct ClientSummary {
    pub profile: client_profile::Model,
    pub email: String,
    pub total_rentals: u64,
}

/// 登录成功后的账号及其客户资料（管理员没有资料）
#[derive(Debug, Clone)]
pub struct Account {
    pub user: user::Model,
    pub profile: Option<client_profile::Model>,
}

impl Account {
    /// 客户端接口要求普通客户身份且已有资料
    pub fn client_profile(&self) -> Option<&client_profile::Model> {
        if self.user.is_client && !self.user.is_superuser {
            self.profile.as_ref()
        } else {
            None
        }
    }

    pub fn is_admin(&self) -> bool {
        self.user.is_superuser
    }
}

fn normalize_email(email: &str) -> ServiceResult<String> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ServiceError::validation("Enter a valid email address"));
    }
    Ok(email)
}

fn validate_password(password: &str, confirm: Option<&str>, policy: &RentalPolicy) -> ServiceResult<()> {
    if let Some(confirm) = confirm {
        if password != confirm {
            return Err(ServiceError::validation("Passwords do not match"));
        }
    }
    if password.chars().count() < policy.min_password_len {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters",
            policy.min_password_len
        )));
    }
    Ok(())
}

async fn ensure_email_free<C: ConnectionTrait>(db: &C, email: &str) -> ServiceResult<()> {
    let taken = user::Entity::find()
        .filter(
            Condition::any()
                .add(user::Column::Email.eq(email))
                .add(user::Column::Username.eq(email)),
        )
        .count(db)
        .await?;
    if taken > 0 {
        return Err(ServiceError::Conflict("A user with this email already exists".to_string()));
    }
    Ok(())
}

fn clean_profile(update: &ProfileUpdate) -> ServiceResult<(String, String, String)> {
    Ok((
        required_text("Full name", &update.full_name, 200)?,
        update.address.trim().to_string(),
        required_text("Phone", &update.phone, 20)?,
    ))
}

pub async fn register_client(
    db: &DatabaseConnection,
    input: RegisterClient,
    policy: &RentalPolicy,
) -> ServiceResult<Account> {
    let email = normalize_email(&input.email)?;
    validate_password(&input.password, Some(&input.password_confirm), policy)?;
    let (full_name, address, phone) = clean_profile(&ProfileUpdate {
        full_name: input.full_name,
        address: input.address,
        phone: input.phone,
    })?;
    let password_hash = hash_password(&input.password).await?;

    let txn = db.begin().await?;
    ensure_email_free(&txn, &email).await?;
    let now = now_standard_string();
    let user = user::ActiveModel {
        username: Set(email.clone()),
        email: Set(email),
        password_hash: Set(password_hash),
        is_client: Set(true),
        is_superuser: Set(false),
        is_active: Set(true),
        created_at: Set(now.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    let profile = client_profile::ActiveModel {
        user_id: Set(user.id),
        full_name: Set(full_name),
        address: Set(address),
        phone: Set(phone),
        is_blocked: Set(false),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!("新客户注册: {} ({})", user.email, profile.id);
    Ok(Account {
        user,
        profile: Some(profile),
    })
}

pub async fn create_superuser<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
    policy: &RentalPolicy,
) -> ServiceResult<user::Model> {
    let email = normalize_email(email)?;
    validate_password(password, None, policy)?;
    ensure_email_free(db, &email).await?;
    let user = user::ActiveModel {
        username: Set(email.clone()),
        email: Set(email),
        password_hash: Set(hash_password(password).await?),
        is_client: Set(false),
        is_superuser: Set(true),
        is_active: Set(true),
        created_at: Set(now_standard_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("已创建管理员账号: {}", user.email);
    Ok(user)
}

pub async fn load_account<C: ConnectionTrait>(db: &C, user_id: i32) -> ServiceResult<Account> {
    let (user, profile) = user::Entity::find_by_id(user_id)
        .find_also_related(client_profile::Entity)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user", user_id))?;
    Ok(Account { user, profile })
}

/// 先按用户名查找，找不到再按邮箱查找
pub async fn authenticate<C: ConnectionTrait>(db: &C, login: &str, password: &str) -> ServiceResult<Account> {
    let login = login.trim();
    if login.is_empty() || password.is_empty() {
        return Err(ServiceError::validation("Please fill in all fields"));
    }
    let invalid = || ServiceError::Unauthorized("Invalid email/username or password".to_string());

    let by_username = user::Entity::find()
        .filter(user::Column::Username.eq(login))
        .one(db)
        .await?;
    let user = match by_username {
        Some(user) => Some(user),
        None => {
            user::Entity::find()
                .filter(user::Column::Email.eq(login.to_lowercase()))
                .one(db)
                .await?
        }
    };
    let user = user.ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash).await? || !user.is_active {
        warn!("登录失败: {}", login);
        return Err(invalid());
    }
    if !user.is_client && !user.is_superuser {
        return Err(ServiceError::Forbidden("You do not have access to this system".to_string()));
    }
    load_account(db, user.id).await
}

pub async fn find_client<C: ConnectionTrait>(db: &C, id: i32) -> ServiceResult<(client_profile::Model, user::Model)> {
    match client_profile::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await?
    {
        Some((profile, Some(user))) => Ok((profile, user)),
        _ => Err(ServiceError::not_found("client", id)),
    }
}

pub async fn update_profile<C: ConnectionTrait>(
    db: &C,
    client_id: i32,
    update: ProfileUpdate,
) -> ServiceResult<client_profile::Model> {
    let (profile, _) = find_client(db, client_id).await?;
    let (full_name, address, phone) = clean_profile(&update)?;
    let mut model = profile.into_active_model();
    model.full_name = Set(full_name);
    model.address = Set(address);
    model.phone = Set(phone);
    Ok(model.update(db).await?)
}

/// 管理员编辑客户资料，可以封禁或解封
pub async fn admin_update_client<C: ConnectionTrait>(
    db: &C,
    client_id: i32,
    update: ProfileUpdate,
    is_blocked: bool,
) -> ServiceResult<client_profile::Model> {
    let (profile, _) = find_client(db, client_id).await?;
    let (full_name, address, phone) = clean_profile(&update)?;
    let was_blocked = profile.is_blocked;
    let mut model = profile.into_active_model();
    model.full_name = Set(full_name);
    model.address = Set(address);
    model.phone = Set(phone);
    model.is_blocked = Set(is_blocked);
    let profile = model.update(db).await?;
    if was_blocked != is_blocked {
        info!("客户 {} 封禁状态变更为 {}", profile.id, is_blocked);
    }
    Ok(profile)
}

/// 删除客户对应的账号，资料、租赁、罚款与支付记录级联删除；返回被删除的用户 id
pub async fn delete_client<C: ConnectionTrait>(db: &C, client_id: i32) -> ServiceResult<i32> {
    let (profile, user) = find_client(db, client_id).await?;
    user::Entity::delete_by_id(user.id).exec(db).await?;
    info!("已删除客户 {} ({})", profile.full_name, user.email);
    Ok(user.id)
}

/// 按姓名、电话或邮箱搜索客户（不区分大小写），新注册的在前
pub async fn list_clients<C: ConnectionTrait>(db: &C, search: Option<&str>) -> ServiceResult<Vec<ClientSummary>> {
    let rows = client_profile::Entity::find()
        .find_also_related(user::Entity)
        .order_by_desc(client_profile::Column::CreatedAt)
        .order_by_desc(client_profile::Column::Id)
        .all(db)
        .await?;

    let needle = search.map(str::trim).filter(|s| !s.is_empty()).map(str::to_lowercase);
    let mut clients = Vec::with_capacity(rows.len());
    for (profile, user) in rows {
        let email = user.map(|u| u.email).unwrap_or_default();
        if let Some(needle) = &needle {
            let matched = [&profile.full_name, &profile.phone, &email]
                .iter()
                .any(|field| field.to_lowercase().contains(needle.as_str()));
            if !matched {
                continue;
            }
        }
        let total_rentals = rental::Entity::find()
            .filter(rental::Column::ClientId.eq(profile.id))
            .count(db)
            .await?;
        clients.push(ClientSummary {
            profile,
            email,
            total_rentals,
        });
    }
    Ok(clients)
}
