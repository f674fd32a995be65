use entities::ENTITIES;
use std::io::Write;
use std::{env, path::PathBuf};

fn main() {
    let out_dir: PathBuf = env::var("OUT_DIR").unwrap().parse().unwrap();

    // Text nodes are decoded the way a browser decodes them before anything
    // scans for delimiters, so `$a &lt; b$` reaches the renderer as `a < b`.
    //
    // Only references terminated by ";" are kept, stored without the "&" and
    // ";" and sorted by name for `entity::lookup`'s binary search.
    let mut named = ENTITIES
        .iter()
        .filter(|e| e.entity.starts_with('&') && e.entity.ends_with(';'))
        .map(|e| (&e.entity[1..e.entity.len() - 1], e.characters))
        .collect::<Vec<_>>();
    named.sort_by_key(|(name, _characters)| *name);
    named.dedup_by_key(|(name, _characters)| *name);

    let longest = named.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let out = std::fs::File::create(out_dir.join("entitydata.rs")).unwrap();
    let mut bw = std::io::BufWriter::new(out);
    writeln!(bw, "mod entitydata {{").unwrap();
    writeln!(bw, "    pub const MAX_NAME_LENGTH: usize = {};", longest).unwrap();
    writeln!(
        bw,
        "    pub static NAMED_REFERENCES: &[(&str, &str); {}] = &[",
        named.len()
    )
    .unwrap();
    for (name, characters) in named {
        writeln!(bw, "        ({:?}, {:?}),", name, characters).unwrap();
    }
    writeln!(bw, "    ];").unwrap();
    writeln!(bw, "}}").unwrap();
}
