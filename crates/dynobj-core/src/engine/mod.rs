//! Reconciliation engine
//!
//! The [`DynObjEngine`] turns "current ranges on the gateway" plus "desired
//! addresses" into a minimal sequence of add/remove commands. It is
//! stateless between calls: every public operation is fetch-current →
//! compute → mutate, with the gateway as the sole source of truth. An
//! actor mutating the object set between the fetch and the mutate steps can
//! make the mutate step fail; that race is accepted, not retried (the only
//! atomicity primitive available is `&&`-chaining two sub-commands inside
//! one exec call).
//!
//! ## Command surface
//!
//! ```text
//! -l                               list all objects
//! -n NAME                          create object
//! -do NAME                         delete object
//! -o NAME -r B1 E1 [B2 E2 ...] -d  delete ranges
//! -o NAME -r B1 E1 [B2 E2 ...] -a  add ranges
//! ```

pub mod intervals;

use crate::addr::{AddrRange, AddrSpec, format_addr};
use crate::error::{Error, Result};
use crate::listing::parse_listing;
use crate::protocol::{CommandRunner, validate_token};
use crate::traits::Transport;
use std::collections::HashMap;
use tracing::{debug, info};

/// Drives the list → diff → mutate cycle against one gateway.
///
/// Operations are strictly sequential; the engine never issues concurrent
/// calls against its transport. Distinct engine instances may reconcile
/// distinct objects concurrently if the transport permits concurrent
/// sessions.
pub struct DynObjEngine {
    runner: CommandRunner,
}

impl DynObjEngine {
    /// Create an engine on top of a transport.
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { runner: CommandRunner::new(transport) }
    }

    /// List all dynamic objects and their ranges.
    ///
    /// Ranges are returned in the gateway's listing order, which is not
    /// required to be sorted or merged.
    pub async fn get_objects(&self) -> Result<HashMap<String, Vec<AddrRange>>> {
        let lines = self.runner.run(&[vec!["-l".to_owned()]]).await?;
        let raw = parse_listing(lines.iter().map(String::as_str));

        let mut objects = HashMap::with_capacity(raw.len());
        for (name, pairs) in raw {
            let ranges = pairs
                .iter()
                .map(|(begin, end)| AddrRange::from_texts(begin, end))
                .collect::<Result<Vec<_>>>()?;
            objects.insert(name, ranges);
        }
        Ok(objects)
    }

    /// Ranges of one object, or `None` if it does not exist.
    pub async fn find_object(&self, name: &str) -> Result<Option<Vec<AddrRange>>> {
        validate_token(name)?;
        Ok(self.get_objects().await?.remove(name))
    }

    /// Ranges of one object; the object must exist.
    pub async fn get_object(&self, name: &str) -> Result<Vec<AddrRange>> {
        self.find_object(name)
            .await?
            .ok_or_else(|| Error::ObjectNotFound(name.to_owned()))
    }

    /// Create a new empty dynamic object.
    ///
    /// With `allow_existing`, an object already present is left untouched
    /// and no command is issued.
    pub async fn create_object(&self, name: &str, allow_existing: bool) -> Result<()> {
        validate_token(name)?;
        if self.find_object(name).await?.is_some() {
            if allow_existing {
                debug!(object = name, "object already exists, nothing to create");
                return Ok(());
            }
            return Err(Error::ObjectAlreadyExists(name.to_owned()));
        }

        info!(object = name, "creating object");
        self.runner.run(&[vec!["-n".to_owned(), name.to_owned()]]).await?;
        Ok(())
    }

    /// Delete a dynamic object. Fails if it does not exist.
    pub async fn delete_object(&self, name: &str) -> Result<()> {
        self.get_object(name).await?;
        info!(object = name, "deleting object");
        self.runner.run(&[vec!["-do".to_owned(), name.to_owned()]]).await?;
        Ok(())
    }

    /// Remove every range from an object. A no-op when the object is
    /// already empty.
    pub async fn clear_object(&self, name: &str) -> Result<()> {
        let ranges = self.get_object(name).await?;
        if ranges.is_empty() {
            debug!(object = name, "object already empty");
            return Ok(());
        }

        info!(object = name, ranges = ranges.len(), "clearing object");
        self.runner.run(&[delete_group(name, &ranges)]).await?;
        Ok(())
    }

    /// Add the covered range of every spec to an object, in one command.
    pub async fn add_addresses(&self, name: &str, specs: &[AddrSpec]) -> Result<()> {
        if specs.is_empty() {
            return Err(Error::EmptyAddressList);
        }
        self.get_object(name).await?;

        let ranges: Vec<AddrRange> = specs.iter().map(AddrSpec::range).collect();
        info!(object = name, ranges = ranges.len(), "adding ranges");
        self.runner.run(&[add_group(name, &ranges)]).await?;
        Ok(())
    }

    /// Remove one spec's covered range from an object.
    ///
    /// Every stored range overlapping the spec is deleted; the parts of
    /// those ranges outside the spec are re-added as residual sub-ranges.
    /// Delete and re-add are chained with `&&` into a single exec call, so
    /// no other command can interleave between them. Fails with
    /// [`Error::AddressNotInObject`] when nothing overlaps.
    pub async fn remove_address(&self, name: &str, spec: &AddrSpec) -> Result<()> {
        let stored = self.get_object(name).await?;
        let target = spec.range();

        let overlapping: Vec<AddrRange> =
            stored.iter().filter(|r| r.overlaps(&target)).copied().collect();
        if overlapping.is_empty() {
            return Err(Error::AddressNotInObject {
                object: name.to_owned(),
                spec: spec.to_string(),
            });
        }

        let mut residuals = Vec::new();
        for range in &overlapping {
            if range.begin < target.begin {
                residuals.push(AddrRange { begin: range.begin, end: target.begin - 1 });
            }
            if target.end < range.end {
                residuals.push(AddrRange { begin: target.end + 1, end: range.end });
            }
        }

        info!(
            object = name,
            spec = %spec,
            deleted = overlapping.len(),
            readded = residuals.len(),
            "removing address range"
        );

        let mut groups = vec![delete_group(name, &overlapping)];
        if !residuals.is_empty() {
            groups.push(add_group(name, &residuals));
        }
        self.runner.run(&groups).await?;
        Ok(())
    }

    /// Reconcile an object to cover exactly the union of the given specs.
    ///
    /// The object is created when absent. The diff is computed by interval
    /// subtraction over the normalized current and desired coverage, and
    /// the whole mutation is batched: one chained command deletes every
    /// stored range touched by the removal set and re-adds the kept
    /// residuals together with the missing intervals.
    pub async fn set_addresses(&self, name: &str, specs: &[AddrSpec]) -> Result<()> {
        validate_token(name)?;

        let stored = match self.find_object(name).await? {
            Some(ranges) => ranges,
            None => {
                self.create_object(name, false).await?;
                Vec::new()
            }
        };

        let current = intervals::normalize(&stored);
        let desired =
            intervals::normalize(&specs.iter().map(AddrSpec::range).collect::<Vec<_>>());

        let to_add = intervals::subtract(&desired, &current);
        let to_remove = intervals::subtract(&current, &desired);
        if to_add.is_empty() && to_remove.is_empty() {
            debug!(object = name, "object already in desired state");
            return Ok(());
        }

        // Stored ranges touched by the removal set are deleted by their
        // original begin/end pairs; everything kept comes back as residuals.
        let mut deletions = Vec::new();
        let mut additions = to_add;
        for range in &stored {
            if to_remove.iter().any(|r| r.overlaps(range)) {
                deletions.push(*range);
                additions.extend(intervals::subtract(&[*range], &to_remove));
            }
        }

        info!(
            object = name,
            deleted = deletions.len(),
            added = additions.len(),
            "reconciling object"
        );

        let mut groups = Vec::new();
        if !deletions.is_empty() {
            groups.push(delete_group(name, &deletions));
        }
        if !additions.is_empty() {
            groups.push(add_group(name, &additions));
        }
        if !groups.is_empty() {
            self.runner.run(&groups).await?;
        }
        Ok(())
    }
}

/// `-o NAME -r B1 E1 ... -d`
fn delete_group(name: &str, ranges: &[AddrRange]) -> Vec<String> {
    range_group(name, ranges, "-d")
}

/// `-o NAME -r B1 E1 ... -a`
fn add_group(name: &str, ranges: &[AddrRange]) -> Vec<String> {
    range_group(name, ranges, "-a")
}

fn range_group(name: &str, ranges: &[AddrRange], flag: &str) -> Vec<String> {
    let mut tokens = vec!["-o".to_owned(), name.to_owned(), "-r".to_owned()];
    for range in ranges {
        tokens.push(format_addr(range.begin));
        tokens.push(format_addr(range.end));
    }
    tokens.push(flag.to_owned());
    tokens
}
