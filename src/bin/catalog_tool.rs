use anyhow::{anyhow, bail, Context, Result};
use metaworkspace::catalog::{EntityCatalog, EntityKind};
use metaworkspace::compose::{compose, SceneInputs};
use metaworkspace::roster::AvatarRoster;
use std::env;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        print_usage();
        return Ok(());
    };
    match command.as_str() {
        "validate" => {
            let path = args
                .next()
                .ok_or_else(|| anyhow!("validate requires a path: catalog_tool validate <catalog>"))?;
            cmd_validate(&path)
        }
        "list" => {
            let path = args.next().ok_or_else(|| anyhow!("list requires a path: catalog_tool list <catalog>"))?;
            cmd_list(&path)
        }
        "ring" => {
            let usage = "catalog_tool ring <catalog> <prefix> <count> <radius> [x y z]";
            let path = args.next().ok_or_else(|| anyhow!("ring requires arguments: {usage}"))?;
            let prefix = args.next().ok_or_else(|| anyhow!("ring missing prefix argument"))?;
            let count = args.next().ok_or_else(|| anyhow!("ring missing count argument"))?;
            let radius = args.next().ok_or_else(|| anyhow!("ring missing radius argument"))?;
            let center: Vec<String> = args.collect();
            cmd_ring(&path, &prefix, &count, &radius, &center)
        }
        "compose" => {
            let path =
                args.next().ok_or_else(|| anyhow!("compose requires a path: catalog_tool compose <catalog>"))?;
            cmd_compose(&path)
        }
        "default" => {
            let path =
                args.next().ok_or_else(|| anyhow!("default requires an output path: catalog_tool default <out>"))?;
            EntityCatalog::default_workspace().save_to_path(&path)?;
            println!("Wrote stock workspace layout to '{path}'");
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => Err(anyhow!("unknown command '{other}'")),
    }
}

fn print_usage() {
    eprintln!(
        "Catalog Tool

Usage:
  catalog_tool validate <catalog>                     Check ids, transforms and room parameters
  catalog_tool list <catalog>                         List entities with kind, position and yaw
  catalog_tool ring <catalog> <prefix> <count> <radius> [x y z]
                                                      Append an inward-facing ring of workstations
  catalog_tool compose <catalog>                      Compose the catalog and print the frame digest
  catalog_tool default <output>                       Write the stock workspace layout
  catalog_tool help                                   Show this message
"
    );
}

fn cmd_validate(path: &str) -> Result<()> {
    let catalog = load_catalog(path)?;
    let mut workstations = 0;
    let mut rooms = 0;
    let mut avatars = 0;
    for entity in catalog.iter() {
        match entity.kind {
            EntityKind::Workstation => workstations += 1,
            EntityKind::MeetingRoom { .. } => rooms += 1,
            EntityKind::Avatar { .. } => avatars += 1,
        }
    }
    println!(
        "Catalog '{}' is valid. Entities: {}. Workstations: {}  Meeting rooms: {}  Avatars: {}",
        path,
        catalog.len(),
        workstations,
        rooms,
        avatars
    );
    Ok(())
}

fn cmd_list(path: &str) -> Result<()> {
    let catalog = load_catalog(path)?;
    println!("{:<5} {:<28} {:<14} {:<28} {}", "Idx", "Entity ID", "Kind", "Position", "Yaw (deg)");
    println!("{}", "-".repeat(96));
    for (index, entity) in catalog.iter().enumerate() {
        let position = format!("({:.2}, {:.2}, {:.2})", entity.position.x, entity.position.y, entity.position.z);
        println!(
            "{:<5} {:<28} {:<14} {:<28} {:.1}",
            index,
            entity.id.as_str(),
            entity.kind.label(),
            position,
            entity.rotation.y.to_degrees()
        );
    }
    Ok(())
}

fn cmd_ring(path: &str, prefix: &str, count: &str, radius: &str, center: &[String]) -> Result<()> {
    let count = count.parse::<u32>().with_context(|| format!("Invalid count '{count}'"))?;
    let radius = radius.parse::<f32>().with_context(|| format!("Invalid radius '{radius}'"))?;
    let center = match center {
        [] => glam::Vec3::ZERO,
        [x, y, z] => glam::Vec3::new(
            x.parse().with_context(|| format!("Invalid center x '{x}'"))?,
            y.parse().with_context(|| format!("Invalid center y '{y}'"))?,
            z.parse().with_context(|| format!("Invalid center z '{z}'"))?,
        ),
        _ => bail!("ring center takes exactly three coordinates"),
    };
    let mut catalog = if Path::new(path).exists() { load_catalog(path)? } else { EntityCatalog::new() };
    catalog.add_ring(prefix, center, count, radius)?;
    catalog.save_to_path(path)?;
    println!("Added {count} workstations around {center:?} to '{path}' ({} entities total)", catalog.len());
    Ok(())
}

fn cmd_compose(path: &str) -> Result<()> {
    let catalog = load_catalog(path)?;
    let roster = AvatarRoster::new();
    let frame = compose(&SceneInputs { catalog: &catalog, roster: &roster, local: None });
    for group in frame.groups() {
        println!("{} {:<28} {:?} primitives={}", group.id, group.source, group.kind, group.len());
    }
    println!("Groups: {}  Primitives: {}  Digest: {}", frame.groups().len(), frame.primitives().len(), frame.digest());
    Ok(())
}

fn load_catalog(path: &str) -> Result<EntityCatalog> {
    let normalized = Path::new(path).canonicalize().unwrap_or_else(|_| Path::new(path).to_path_buf());
    EntityCatalog::load_from_path(&normalized).with_context(|| format!("loading catalog '{}'", normalized.display()))
}
