use nom::HexDisplay;
use std::cmp::min;
use std::env;
use std::io;
use x509_altname::asn1_rs::Oid;
use x509_altname::prelude::*;

fn print_hex_dump(bytes: &[u8], max_len: usize) {
    let m = min(bytes.len(), max_len);
    print!("{}", &bytes[..m].to_hex(16));
    if bytes.len() > max_len {
        println!("... <continued>");
    }
}

fn format_oid(oid: &Oid) -> String {
    match oid2ln(oid) {
        Ok(s) => s.to_owned(),
        _ => format!("{}", oid),
    }
}

fn print_alt_name(alt_name: &AltName) {
    for name in alt_name.iter() {
        println!("        {}", name);
    }
}

fn print_x509_extension(ext: &X509Extension) {
    println!(
        "    [crit:{} l:{}] {}: ",
        ext.critical,
        ext.value.len(),
        format_oid(&ext.oid)
    );
    match ext.parsed_extension() {
        ParsedExtension::SubjectAlternativeName(san) => print_alt_name(san),
        ParsedExtension::IssuerAlternativeName(ian) => print_alt_name(ian),
        ParsedExtension::ParseError { error } => {
            eprintln!("      Error: {}", error);
            print_hex_dump(&ext.value, 256);
        }
        _ => print_hex_dump(&ext.value, 256),
    }
}

pub fn main() -> io::Result<()> {
    for file_name in env::args().skip(1) {
        println!("File: {}", file_name);
        let data = std::fs::read(file_name.clone()).expect("Unable to read file");
        match X509Extension::from_der(&data) {
            Ok((_rem, ext)) => {
                print_x509_extension(&ext);
                if env::var("JSON").is_ok() {
                    println!("{}", ext.to_json());
                }
            }
            Err(e) => {
                eprintln!("Error while parsing {}: {}", file_name, e);
            }
        }
    }
    Ok(())
}
