use std::{
    collections::HashMap,
    ffi::CStr,
    fmt::Debug,
    sync::{Mutex, PoisonError},
};

use once_cell::sync::Lazy;

/// Service name reported when a port has no known mapping.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Source of conventional service labels for TCP ports.
pub trait ServiceNames: Debug + Send + Sync {
    fn lookup(&self, port: u16) -> Option<String>;

    fn name_or_unknown(&self, port: u16) -> String {
        self.lookup(port)
            .unwrap_or_else(|| String::from(UNKNOWN_SERVICE))
    }
}

const WELL_KNOWN: &[(u16, &str)] = &[
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (53, "domain"),
    (80, "http"),
    (110, "pop3"),
    (111, "sunrpc"),
    (135, "epmap"),
    (139, "netbios-ssn"),
    (143, "imap2"),
    (389, "ldap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (465, "submissions"),
    (587, "submission"),
    (636, "ldaps"),
    (993, "imaps"),
    (995, "pop3s"),
    (1433, "ms-sql-s"),
    (1723, "pptp"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (5432, "postgresql"),
    (5900, "rfb"),
    (6379, "redis"),
    (8080, "http-alt"),
    (27017, "mongodb"),
];

static BUILTIN: Lazy<ServiceTable> = Lazy::new(|| WELL_KNOWN.iter().copied().collect());

/// In-memory port to name table.
#[derive(Debug, Default, Clone)]
pub struct ServiceTable {
    names: HashMap<u16, String>,
}

impl ServiceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table of common well-known TCP services.
    pub fn builtin() -> &'static ServiceTable {
        &BUILTIN
    }

    pub fn insert(&mut self, port: u16, name: impl Into<String>) {
        self.names.insert(port, name.into());
    }
}

impl<'a> FromIterator<(u16, &'a str)> for ServiceTable {
    fn from_iter<I: IntoIterator<Item = (u16, &'a str)>>(iter: I) -> Self {
        let mut table = Self::new();
        iter.into_iter()
            .for_each(|(port, name)| table.insert(port, name));
        table
    }
}

impl ServiceNames for ServiceTable {
    fn lookup(&self, port: u16) -> Option<String> {
        self.names.get(&port).cloned()
    }
}

const TCP_PROTO: &[u8] = b"tcp\0";

// getservbyport returns a pointer into static storage.
static SERVICES_DB: Mutex<()> = Mutex::new(());

/// Local services database (`/etc/services`), backed by the built-in table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemServices;

impl SystemServices {
    fn query_db(port: u16) -> Option<String> {
        let _guard = SERVICES_DB.lock().unwrap_or_else(PoisonError::into_inner);

        let proto = TCP_PROTO.as_ptr() as *const libc::c_char;
        let entry = unsafe { libc::getservbyport(libc::c_int::from(port.to_be()), proto) };
        if entry.is_null() {
            return None;
        }

        let name = unsafe { (*entry).s_name };
        if name.is_null() {
            return None;
        }

        let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
        (!name.is_empty()).then_some(name)
    }
}

impl ServiceNames for SystemServices {
    fn lookup(&self, port: u16) -> Option<String> {
        Self::query_db(port).or_else(|| ServiceTable::builtin().lookup(port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_knows_common_ports() {
        let table = ServiceTable::builtin();
        assert_eq!(table.lookup(22).as_deref(), Some("ssh"));
        assert_eq!(table.lookup(443).as_deref(), Some("https"));
        assert_eq!(table.lookup(1), None);
    }

    #[test]
    fn missing_entry_falls_back_to_sentinel() {
        let table = ServiceTable::new();
        assert_eq!(table.name_or_unknown(80), UNKNOWN_SERVICE);
    }

    #[test]
    fn custom_table_overrides() {
        let mut table = ServiceTable::new();
        table.insert(8080, "dev-server");
        assert_eq!(table.name_or_unknown(8080), "dev-server");
        assert_eq!(table.lookup(80), None);
    }

    #[test]
    fn system_lookup_always_names_well_known_ports() {
        // Either the local database or the built-in table must answer.
        let name = SystemServices.name_or_unknown(22);
        assert_ne!(name, UNKNOWN_SERVICE);
    }
}
