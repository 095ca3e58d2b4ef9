#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let _ = strucdev_struct::parse_pdb(data);
    let _ = strucdev_struct::split_models(data);
    let _ = strucdev_struct::parse_atom_groups(data);
});
