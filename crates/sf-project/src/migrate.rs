//! Schema migration framework.

use crate::ProjectError;
use crate::schema::SystemDef;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut def: SystemDef) -> Result<SystemDef, ProjectError> {
    while def.version < LATEST_VERSION {
        def = migrate_one_version(def)?;
    }
    Ok(def)
}

fn migrate_one_version(def: SystemDef) -> Result<SystemDef, ProjectError> {
    match def.version {
        0 => migrate_v0_to_v1(def),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 files carried no options; defaults apply.
fn migrate_v0_to_v1(mut def: SystemDef) -> Result<SystemDef, ProjectError> {
    def.version = 1;
    Ok(def)
}
