use anyhow::{bail, Result};
use car_rental_entity::user;
use dialoguer::{Input, Password};
use sea_orm::DatabaseConnection;

use crate::config::{CreateSuperuserArgs, RentalPolicy};
use crate::service::account::create_superuser;
use crate::utils::validation::is_valid_email;

/// 补齐命令行未给出的邮箱和密码，--no-input 时缺少任何一项直接报错
fn collect_credentials(args: &CreateSuperuserArgs, policy: &RentalPolicy) -> Result<(String, String)> {
    let email = match &args.email {
        Some(email) => email.clone(),
        None if args.no_input => bail!("--email is required with --no-input"),
        None => Input::<String>::new()
            .with_prompt("Email")
            .validate_with(|input: &String| -> Result<(), &str> {
                if is_valid_email(input.trim()) {
                    Ok(())
                } else {
                    Err("Enter a valid email address")
                }
            })
            .interact_text()?,
    };

    let password = match &args.password {
        Some(password) => password.clone(),
        None if args.no_input => bail!("--password or CAR_RENTAL_SUPERUSER_PASSWORD is required with --no-input"),
        None => {
            let min_len = policy.min_password_len;
            Password::new()
                .with_prompt("Password")
                .with_confirmation("Password (again)", "Passwords do not match")
                .validate_with(move |input: &String| -> Result<(), String> {
                    if input.chars().count() >= min_len {
                        Ok(())
                    } else {
                        Err(format!("Password must be at least {min_len} characters"))
                    }
                })
                .interact()?
        }
    };
    Ok((email, password))
}

pub async fn create_superuser_command(
    db: &DatabaseConnection,
    args: &CreateSuperuserArgs,
    policy: &RentalPolicy,
) -> Result<user::Model> {
    let (email, password) = collect_credentials(args, policy)?;
    Ok(create_superuser(db, &email, &password, policy).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use crate::test_support::{Fixture, PASSWORD};

    fn args(email: Option<&str>, password: Option<&str>) -> CreateSuperuserArgs {
        CreateSuperuserArgs {
            email: email.map(str::to_string),
            password: password.map(str::to_string),
            no_input: true,
        }
    }

    #[tokio::test]
    async fn test_create_superuser_without_prompt() {
        let fx = Fixture::new().await;
        let policy = RentalPolicy::default();
        let admin = create_superuser_command(&fx.db, &args(Some("Root@Example.com"), Some(PASSWORD)), &policy)
            .await
            .unwrap();
        assert!(admin.is_superuser);
        assert!(!admin.is_client);
        assert_eq!(admin.email, "root@example.com");

        let err = create_superuser_command(&fx.db, &args(Some("root@example.com"), Some(PASSWORD)), &policy)
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ServiceError>(), Some(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_no_input_requires_all_values() {
        let fx = Fixture::new().await;
        let policy = RentalPolicy::default();
        let err = create_superuser_command(&fx.db, &args(None, Some(PASSWORD)), &policy)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--email"));
        let err = create_superuser_command(&fx.db, &args(Some("root@example.com"), None), &policy)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--password"));
        let err = create_superuser_command(&fx.db, &args(Some("root@example.com"), Some("short")), &policy)
            .await
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<ServiceError>(), Some(ServiceError::Validation(_))));
    }
}
