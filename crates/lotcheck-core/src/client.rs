//! Static client (warehouse owner) directory.
//!
//! The order API scopes every request by tenant and owner. The tenant is
//! fixed per installation; the owner identifies the client whose goods are
//! being shipped and can be switched between a short list of entries.

use std::fmt;
use std::str::FromStr;

use crate::CheckError;

/// Owner id the order API was provisioned with.
pub const DEFAULT_OWNER: &str = "0157A619-B0CF-4327-82B2-E4084DBAC7DD";
pub const DEFAULT_CLIENT: &str = "default";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub name: String,
    pub owner_id: String,
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.owner_id)
    }
}

/// Parses `NAME=OWNER`.
impl FromStr for Client {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, owner) = s
            .split_once('=')
            .ok_or_else(|| CheckError::InvalidClientEntry(s.to_string()))?;
        let (name, owner) = (name.trim(), owner.trim());
        if name.is_empty() || owner.is_empty() {
            return Err(CheckError::InvalidClientEntry(s.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            owner_id: owner.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ClientDirectory {
    clients: Vec<Client>,
}

impl Default for ClientDirectory {
    fn default() -> Self {
        Self {
            clients: vec![Client {
                name: DEFAULT_CLIENT.to_string(),
                owner_id: DEFAULT_OWNER.to_string(),
            }],
        }
    }
}

impl ClientDirectory {
    /// Built-in entries plus `extra`. An extra entry with an existing name
    /// replaces it.
    pub fn with_entries(extra: impl IntoIterator<Item = Client>) -> Self {
        let mut dir = Self::default();
        for client in extra {
            match dir
                .clients
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(&client.name))
            {
                Some(existing) => *existing = client,
                None => dir.clients.push(client),
            }
        }
        dir
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn find(&self, name: &str) -> Result<&Client, CheckError> {
        let name = name.trim();
        self.clients
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CheckError::UnknownClient(name.to_string()))
    }

    /// First entry; the directory is never empty.
    pub fn default_client(&self) -> &Client {
        &self.clients[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directory_has_provisioned_owner() {
        let dir = ClientDirectory::default();
        assert_eq!(dir.clients().len(), 1);
        assert_eq!(dir.default_client().owner_id, DEFAULT_OWNER);
    }

    #[test]
    fn parse_entry() {
        let c: Client = " acme = 11111111-2222 ".parse().unwrap();
        assert_eq!(c.name, "acme");
        assert_eq!(c.owner_id, "11111111-2222");
        assert!("acme".parse::<Client>().is_err());
        assert!("=x".parse::<Client>().is_err());
    }

    #[test]
    fn extra_entries_extend_and_override() {
        let dir = ClientDirectory::with_entries(vec![
            "acme=A".parse().unwrap(),
            "DEFAULT=B".parse().unwrap(),
        ]);
        assert_eq!(dir.clients().len(), 2);
        assert_eq!(dir.find("Acme").unwrap().owner_id, "A");
        assert_eq!(dir.default_client().owner_id, "B");
        assert_eq!(
            dir.find("nope").unwrap_err(),
            CheckError::UnknownClient("nope".into())
        );
    }
}
