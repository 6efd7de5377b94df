//! Defines functions for handling user sessions with a private cookie.
//!
//! The session cookie value is `"{user_id}:{expiry}"` where `expiry` is a
//! unix timestamp. The cookie is encrypted and signed by
//! [PrivateCookieJar], so clients cannot read or forge its contents.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::{Duration, OffsetDateTime};

use crate::{Error, models::UserId};

/// The name of the session cookie.
pub const COOKIE_SESSION: &str = "session";

/// The default duration for which session cookies are valid.
pub(crate) const DEFAULT_COOKIE_DURATION: Duration = Duration::hours(24);

/// Add a session cookie to the cookie jar, indicating that a user is logged
/// in and authenticated.
///
/// Sets the expiry of the cookie to `duration` from the current time.
///
/// Returns the cookie jar with the cookie added.
pub(crate) fn set_auth_cookie(
    jar: PrivateCookieJar,
    user_id: UserId,
    duration: Duration,
) -> PrivateCookieJar {
    let expiry = OffsetDateTime::now_utc() + duration;
    let value = format!("{}:{}", user_id.as_i64(), expiry.unix_timestamp());

    jar.add(
        Cookie::build((COOKIE_SESSION, value))
            .expires(expiry)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Set the session cookie to an invalid value and set its max age to zero,
/// which should delete the cookie on the client side.
pub(crate) fn invalidate_auth_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_SESSION, "deleted"))
            .expires(OffsetDateTime::UNIX_EPOCH)
            .max_age(Duration::ZERO)
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(true),
    )
}

/// Extract the signed-in user's ID from the session cookie in `jar`.
///
/// # Errors
/// Returns an [Error::Unauthorized] if the cookie is missing, malformed or
/// expired.
pub(crate) fn get_session(jar: &PrivateCookieJar) -> Result<UserId, Error> {
    let cookie = jar.get(COOKIE_SESSION).ok_or(Error::Unauthorized)?;

    let (user_id, expiry) = cookie
        .value_trimmed()
        .split_once(':')
        .ok_or(Error::Unauthorized)?;
    let user_id: i64 = user_id.parse().map_err(|_| Error::Unauthorized)?;
    let expiry: i64 = expiry.parse().map_err(|_| Error::Unauthorized)?;

    if expiry < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(Error::Unauthorized);
    }

    Ok(UserId::new(user_id))
}
