//! Cookie-backed token storage.
//!
//! [`CookieJar`] has the shape of `document.cookie`: reading yields every
//! visible entry as one `k1=v1; k2=v2` blob, writing applies a single
//! `Set-Cookie`-style record. [`CookieTokenStore`] layers the token key,
//! expiry and path discipline on top of it.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use portal_bridge::{CookieJar, CookieTokenStore, MemoryCookieJar, TokenStore};
//!
//! let jar = Arc::new(MemoryCookieJar::new());
//! let store = CookieTokenStore::new(jar.clone());
//!
//! store.set("abc; def");
//! assert_eq!(store.get().as_deref(), Some("abc; def"));
//! assert!(jar.read_all().contains("authToken=abc%3B%20def"));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::{TOKEN_COOKIE_KEY, TOKEN_LIFETIME, TokenStore};

// ============================================================================
// Constants
// ============================================================================

/// Date written by `remove` so the jar drops the entry immediately.
const EXPIRED_DATE: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// `strftime` pattern for cookie `expires` attributes.
const COOKIE_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// ============================================================================
// Types
// ============================================================================

/// Source of the current time, swappable in tests.
pub type Clock = fn() -> DateTime<Utc>;

// ============================================================================
// CookieJar
// ============================================================================

/// A cookie store with `document.cookie` semantics.
pub trait CookieJar: Send + Sync {
    /// Returns all live entries as a `name=value` list separated by `; `.
    fn read_all(&self) -> String;

    /// Applies one `name=value; attr=...` record.
    fn write(&self, record: &str);
}

// ============================================================================
// CookieTokenStore
// ============================================================================

/// Stores the token as the `authToken` cookie.
///
/// Values are percent-encoded on write so separators inside the token cannot
/// split the record. A store created with [`CookieTokenStore::detached`] has
/// no jar at all (server-side rendering) and turns every call into a no-op.
#[derive(Clone)]
pub struct CookieTokenStore {
    jar: Option<Arc<dyn CookieJar>>,
    clock: Clock,
}

impl fmt::Debug for CookieTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieTokenStore")
            .field("attached", &self.jar.is_some())
            .finish_non_exhaustive()
    }
}

impl CookieTokenStore {
    /// Creates a store over `jar`.
    #[inline]
    #[must_use]
    pub fn new(jar: Arc<dyn CookieJar>) -> Self {
        Self {
            jar: Some(jar),
            clock: Utc::now,
        }
    }

    /// Creates a store with no cookie jar behind it.
    #[inline]
    #[must_use]
    pub fn detached() -> Self {
        Self {
            jar: None,
            clock: Utc::now,
        }
    }

    /// Replaces the clock used to compute expiry dates.
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns `true` if a cookie jar is attached.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.jar.is_some()
    }

    /// Builds the record written by `set`.
    fn set_record(&self, token: &str) -> String {
        let expires = (self.clock)() + lifetime();
        format!(
            "{TOKEN_COOKIE_KEY}={}; expires={}; path=/",
            urlencoding::encode(token),
            expires.format(COOKIE_DATE_FORMAT)
        )
    }
}

impl TokenStore for CookieTokenStore {
    fn set(&self, token: &str) {
        let Some(jar) = &self.jar else {
            trace!("No cookie jar, skipping token write");
            return;
        };

        debug!(token_len = token.len(), "Writing token cookie");
        jar.write(&self.set_record(token));
    }

    fn get(&self) -> Option<String> {
        let jar = self.jar.as_ref()?;
        let blob = jar.read_all();
        find_cookie(&blob, TOKEN_COOKIE_KEY).map(decode_value)
    }

    fn remove(&self) {
        let Some(jar) = &self.jar else {
            trace!("No cookie jar, skipping token removal");
            return;
        };

        debug!("Expiring token cookie");
        jar.write(&format!(
            "{TOKEN_COOKIE_KEY}=; expires={EXPIRED_DATE}; path=/"
        ));
    }
}

// ============================================================================
// MemoryCookieJar
// ============================================================================

/// One cookie held by [`MemoryCookieJar`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    expires: Option<DateTime<Utc>>,
}

/// In-process cookie jar with browser semantics.
///
/// - A record whose expiry is not in the future deletes the entry.
/// - A record for an existing name and path replaces it in place.
/// - Expired entries are hidden from [`CookieJar::read_all`].
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
    clock: Clock,
}

impl fmt::Debug for MemoryCookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryCookieJar")
            .field("count", &self.cookies.lock().len())
            .finish_non_exhaustive()
    }
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCookieJar {
    /// Creates an empty jar.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            clock: Utc::now,
        }
    }

    /// Replaces the clock used to evaluate expiry.
    #[inline]
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the expiry recorded for `name`, if the entry exists.
    #[must_use]
    pub fn expires_of(&self, name: &str) -> Option<DateTime<Utc>> {
        self.cookies
            .lock()
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.expires)
    }

    /// Returns the path recorded for `name`, if the entry exists.
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<String> {
        self.cookies
            .lock()
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.path.clone())
    }
}

impl CookieJar for MemoryCookieJar {
    fn read_all(&self) -> String {
        let now = (self.clock)();
        self.cookies
            .lock()
            .iter()
            .filter(|c| c.expires.is_none_or(|at| at > now))
            .map(|c| format!("{}={}", c.name, c.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write(&self, record: &str) {
        let now = (self.clock)();
        let Some(cookie) = parse_record(record, now) else {
            trace!("Ignoring malformed cookie record");
            return;
        };

        let mut cookies = self.cookies.lock();
        let existing = cookies
            .iter()
            .position(|c| c.name == cookie.name && c.path == cookie.path);

        if cookie.expires.is_some_and(|at| at <= now) {
            if let Some(index) = existing {
                cookies.remove(index);
            }
            return;
        }

        match existing {
            Some(index) => cookies[index] = cookie,
            None => cookies.push(cookie),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

#[inline]
fn lifetime() -> TimeDelta {
    TimeDelta::seconds(TOKEN_LIFETIME.as_secs() as i64)
}

/// Finds the raw value of `name` in a `k1=v1; k2=v2` blob.
fn find_cookie<'a>(blob: &'a str, name: &str) -> Option<&'a str> {
    blob.split(';').map(str::trim).find_map(|entry| {
        entry
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
    })
}

/// Percent-decodes a cookie value, keeping the raw text if it is not UTF-8.
fn decode_value(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Parses a `name=value; expires=...; max-age=...; path=...` record.
fn parse_record(record: &str, now: DateTime<Utc>) -> Option<StoredCookie> {
    let mut parts = record.split(';').map(str::trim);
    let (name, value) = parts.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut cookie = StoredCookie {
        name: name.to_string(),
        value: value.trim().to_string(),
        path: "/".to_string(),
        expires: None,
    };
    let mut max_age = None;

    for attribute in parts {
        let (key, val) = attribute.split_once('=').unwrap_or((attribute, ""));
        match key.trim().to_ascii_lowercase().as_str() {
            "expires" => {
                cookie.expires = DateTime::parse_from_rfc2822(val.trim())
                    .ok()
                    .map(|at| at.with_timezone(&Utc));
            }
            "max-age" => max_age = val.trim().parse::<i64>().ok(),
            "path" => cookie.path = val.trim().to_string(),
            _ => {}
        }
    }

    // max-age wins over expires when both are present
    if let Some(seconds) = max_age {
        cookie.expires = Some(expiry_after(now, seconds));
    }

    Some(cookie)
}

/// `now + seconds`, clamped to the representable range.
fn expiry_after(now: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(seconds)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(if seconds > 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use proptest::prelude::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn store_with_jar() -> (CookieTokenStore, Arc<MemoryCookieJar>) {
        let jar = Arc::new(MemoryCookieJar::new());
        (CookieTokenStore::new(jar.clone()), jar)
    }

    #[test]
    fn test_has_lifecycle() {
        let (store, _) = store_with_jar();
        assert!(!store.has());

        store.set("abc");
        assert!(store.has());

        store.remove();
        assert!(!store.has());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let (store, jar) = store_with_jar();
        store.set("first");
        store.set("second");

        assert_eq!(store.get().as_deref(), Some("second"));
        assert_eq!(jar.read_all(), "authToken=second");
    }

    #[test]
    fn test_set_record_format() {
        let store = CookieTokenStore::new(Arc::new(MemoryCookieJar::new())).with_clock(fixed_now);
        assert_eq!(
            store.set_record("a b"),
            "authToken=a%20b; expires=Sun, 31 Mar 2024 12:00:00 GMT; path=/"
        );
    }

    #[test]
    fn test_set_writes_expiry_and_root_path() {
        let jar = Arc::new(MemoryCookieJar::new().with_clock(fixed_now));
        let store = CookieTokenStore::new(jar.clone()).with_clock(fixed_now);
        store.set("abc");

        let expected = fixed_now() + lifetime();
        assert_eq!(jar.expires_of(TOKEN_COOKIE_KEY), Some(expected));
        assert_eq!(jar.path_of(TOKEN_COOKIE_KEY).as_deref(), Some("/"));
    }

    #[test]
    fn test_get_among_other_cookies() {
        let (store, jar) = store_with_jar();
        jar.write("theme=dark; path=/");
        store.set("tok");
        jar.write("authTokenLegacy=old; path=/");

        assert_eq!(jar.read_all(), "theme=dark; authToken=tok; authTokenLegacy=old");
        assert_eq!(store.get().as_deref(), Some("tok"));
    }

    #[test]
    fn test_get_does_not_match_key_prefix() {
        let (store, jar) = store_with_jar();
        jar.write("authTokenLegacy=old; path=/");
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_get_from_raw_browser_blob() {
        struct FixedJar;
        impl CookieJar for FixedJar {
            fn read_all(&self) -> String {
                "  lang=en ;authToken=x%3Dy%3Bz  ;  other=1".to_string()
            }
            fn write(&self, _record: &str) {}
        }

        let store = CookieTokenStore::new(Arc::new(FixedJar));
        assert_eq!(store.get().as_deref(), Some("x=y;z"));
    }

    #[test]
    fn test_detached_store_is_noop() {
        let store = CookieTokenStore::detached();
        store.set("abc");
        assert!(!store.is_attached());
        assert!(!store.has());
        store.remove();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_expired_cookie_hidden() {
        let jar = MemoryCookieJar::new().with_clock(fixed_now);
        jar.write("authToken=abc; expires=Sun, 31 Mar 2024 12:00:00 GMT; path=/");
        assert_eq!(jar.read_all(), "authToken=abc");

        jar.cookies.lock()[0].expires = Some(fixed_now() - TimeDelta::seconds(1));
        assert_eq!(jar.read_all(), "");
    }

    #[test]
    fn test_past_expiry_deletes_entry() {
        let jar = MemoryCookieJar::new().with_clock(fixed_now);
        jar.write("authToken=abc; path=/");
        jar.write("authToken=; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/");
        assert!(jar.cookies.lock().is_empty());
    }

    #[test]
    fn test_parse_record_max_age_zero_deletes() {
        let jar = MemoryCookieJar::new();
        jar.write("a=1; path=/");
        jar.write("a=; max-age=0; path=/");
        assert_eq!(jar.read_all(), "");
    }

    #[test]
    fn test_parse_record_max_age_out_of_range_clamps() {
        let jar = MemoryCookieJar::new().with_clock(fixed_now);
        jar.write("a=1; max-age=9223372036854775807; path=/");
        assert_eq!(jar.read_all(), "a=1");
        assert_eq!(jar.expires_of("a"), Some(DateTime::<Utc>::MAX_UTC));

        jar.write("a=; max-age=-9223372036854775808; path=/");
        assert_eq!(jar.read_all(), "");
    }

    #[test]
    fn test_parse_record_rejects_missing_name() {
        assert!(parse_record("=value", fixed_now()).is_none());
        assert!(parse_record("novalue", fixed_now()).is_none());
    }

    proptest! {
        #[test]
        fn prop_printable_tokens_round_trip(token in "[ -~]{1,64}") {
            let (store, _) = store_with_jar();
            store.set(&token);
            prop_assert_eq!(store.get(), Some(token));
        }
    }
}
