use crate::error::AppError;
use crate::ids::unique_id;
use crate::model::{NewUser, User, UserPatch};
use crate::storage::json_store::{Collection, Store};
use time::OffsetDateTime;

pub fn list_users(store: &Store) -> Result<Vec<User>, AppError> {
    store.load(Collection::Users)
}

pub fn find_user_by_email(store: &Store, email: &str) -> Result<User, AppError> {
    let email = email.trim();
    list_users(store)?
        .into_iter()
        .find(|user| user.email.eq_ignore_ascii_case(email))
        .ok_or_else(|| AppError::not_found(format!("no user with email {email}")))
}

pub fn create_user(store: &Store, new_user: NewUser, now: OffsetDateTime) -> Result<User, AppError> {
    let name = required_field("name", &new_user.name)?;
    let email = valid_email(&new_user.email)?;

    let mut users = list_users(store)?;
    ensure_email_free(&users, &email, None)?;

    let id = match new_user.id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => {
            if users.iter().any(|user| user.id == id) {
                return Err(AppError::invalid_input(format!("user {id} already exists")));
            }
            id.to_string()
        }
        _ => unique_id("user", now, |candidate| {
            users.iter().any(|user| user.id == candidate)
        }),
    };

    let user = User { id, name, email };
    users.push(user.clone());
    store.save(Collection::Users, &users)?;
    tracing::info!(user_id = %user.id, "user created");

    Ok(user)
}

pub fn update_user(store: &Store, id: &str, patch: UserPatch) -> Result<User, AppError> {
    let trimmed_id = id.trim();
    let mut users = list_users(store)?;
    let index = users
        .iter()
        .position(|user| user.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("user {trimmed_id} not found")))?;

    if let Some(name) = &patch.name {
        users[index].name = required_field("name", name)?;
    }
    if let Some(email) = &patch.email {
        let email = valid_email(email)?;
        ensure_email_free(&users, &email, Some(trimmed_id))?;
        users[index].email = email;
    }

    store.save(Collection::Users, &users)?;
    tracing::info!(user_id = trimmed_id, "user updated");
    Ok(users[index].clone())
}

pub fn delete_user(store: &Store, id: &str) -> Result<User, AppError> {
    let trimmed_id = id.trim();
    let mut users = list_users(store)?;
    let index = users
        .iter()
        .position(|user| user.id == trimmed_id)
        .ok_or_else(|| AppError::not_found(format!("user {trimmed_id} not found")))?;

    let removed = users.remove(index);
    store.save(Collection::Users, &users)?;
    tracing::info!(user_id = trimmed_id, "user deleted");
    Ok(removed)
}

fn required_field(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn valid_email(value: &str) -> Result<String, AppError> {
    let email = required_field("email", value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::invalid_input(format!("invalid email {email}"))),
    }
}

fn ensure_email_free(users: &[User], email: &str, except_id: Option<&str>) -> Result<(), AppError> {
    let taken = users
        .iter()
        .filter(|user| Some(user.id.as_str()) != except_id)
        .any(|user| user.email.eq_ignore_ascii_case(email));
    if taken {
        return Err(AppError::invalid_input(format!("email {email} is already in use")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{create_user, delete_user, find_user_by_email, list_users, update_user};
    use crate::model::{NewUser, UserPatch};
    use crate::storage::json_store::Store;
    use time::macros::datetime;

    fn new_user(name: &str, email: &str) -> NewUser {
        NewUser {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn create_and_find_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let now = datetime!(2025-01-01 00:00:00 UTC);

        let ana = create_user(&store, new_user("Ana", "ana@example.com"), now).unwrap();
        assert_eq!(ana.id, "user-1735689600000");

        let found = find_user_by_email(&store, "ANA@example.com").unwrap();
        assert_eq!(found, ana);
    }

    #[test]
    fn email_must_be_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let now = datetime!(2025-01-01 00:00:00 UTC);

        create_user(&store, new_user("Ana", "ana@example.com"), now).unwrap();
        let bo = create_user(&store, new_user("Bo", "bo@example.com"), now).unwrap();

        let err = create_user(&store, new_user("Other", "Ana@Example.com"), now).unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let steal = UserPatch {
            email: Some("ana@example.com".to_string()),
            ..UserPatch::default()
        };
        let err = update_user(&store, &bo.id, steal).unwrap_err();
        assert_eq!(err.code(), "invalid_input");

        let keep = UserPatch {
            email: Some("bo@example.com".to_string()),
            name: Some("Bo B.".to_string()),
        };
        assert_eq!(update_user(&store, &bo.id, keep).unwrap().name, "Bo B.");
    }

    #[test]
    fn rejects_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let now = datetime!(2025-01-01 00:00:00 UTC);

        assert!(create_user(&store, new_user(" ", "x@example.com"), now).is_err());
        assert!(create_user(&store, new_user("X", "not-an-email"), now).is_err());
        assert!(list_users(&store).unwrap().is_empty());
    }

    #[test]
    fn delete_user_reports_missing_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let now = datetime!(2025-01-01 00:00:00 UTC);
        let ana = create_user(&store, new_user("Ana", "ana@example.com"), now).unwrap();

        assert_eq!(delete_user(&store, &ana.id).unwrap(), ana);
        assert_eq!(delete_user(&store, &ana.id).unwrap_err().code(), "not_found");
    }
}
