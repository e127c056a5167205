//! Basic usage example for tagwire
//!
//! Run with: cargo run --example basic_usage

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use tagwire::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct Trade {
    seq: u32,
    timestamp_ns: u64,
    price: i64,
    quantity: u32,
    symbol: String,
    note: String,
}

impl Message for Trade {
    fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
        self.seq.write_field(enc, 0)?;
        self.timestamp_ns.write_field(enc, 1)?;
        self.price.write_field(enc, 2)?;
        self.quantity.write_field(enc, 3)?;
        self.symbol.write_field(enc, 4)?;
        self.note.write_field(enc, 5)
    }

    fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
        self.seq.read_field(dec, 0, true)?;
        self.timestamp_ns.read_field(dec, 1, true)?;
        self.price.read_field(dec, 2, true)?;
        self.quantity.read_field(dec, 3, true)?;
        self.symbol.read_field(dec, 4, false)?;
        self.note.read_field(dec, 5, false)
    }
}

/// An older reader that predates the symbol and note fields
#[derive(Debug, Default)]
struct TradeV1 {
    seq: u32,
    price: i64,
}

impl Message for TradeV1 {
    fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
        self.seq.write_field(enc, 0)?;
        self.price.write_field(enc, 2)
    }

    fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
        self.seq.read_field(dec, 0, true)?;
        self.price.read_field(dec, 2, true)
    }
}

#[derive(Debug, Default, PartialEq)]
struct Portfolio {
    owner: String,
    trades: Vec<Trade>,
    positions: BTreeMap<String, i64>,
    signature: Vec<u8>,
}

impl Message for Portfolio {
    fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
        self.owner.write_field(enc, 0)?;
        self.trades.write_field(enc, 1)?;
        self.positions.write_field(enc, 2)?;
        self.signature.write_field(enc, 20)
    }

    fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
        self.owner.read_field(dec, 0, true)?;
        self.trades.read_field(dec, 1, false)?;
        self.positions.read_field(dec, 2, false)?;
        self.signature.read_field(dec, 20, false)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> std::result::Result<(), Error> {
    println!("tagwire Basic Usage Example");
    println!("===========================");

    // Example 1: Simple trade, zero and empty fields cost one byte each
    println!("\n1. Simple Trade Message:");
    let trade = Trade {
        seq: 12345,
        timestamp_ns: 1_700_000_000_000_000_000,
        price: 50_000_000,
        quantity: 100,
        ..Default::default()
    };
    let bytes = encode(&trade)?;
    println!("  Encoded {} bytes: {}", bytes.len(), hex(&bytes));

    let mut decoded = Trade::default();
    decode(&bytes, &mut decoded)?;
    println!("  Decoded: {:?}", decoded);

    // Example 2: Optional fields
    println!("\n2. Trade Message with Optional Fields:");
    let trade = Trade {
        seq: 67890,
        timestamp_ns: 1_700_000_001_000_000_000,
        price: -25_500_000,
        quantity: 200,
        symbol: "AAPL".into(),
        note: "Stop loss order".into(),
    };
    let bytes = encode(&trade)?;
    println!("  Encoded {} bytes", bytes.len());

    // Example 3: An older reader skips fields it does not know
    println!("\n3. Forward Compatibility:");
    let mut old = TradeV1::default();
    decode(&bytes, &mut old)?;
    println!("  Old reader sees seq={}, price={}", old.seq, old.price);

    // Example 4: Nested structs, lists, maps and blobs
    println!("\n4. Nested Containers:");
    let portfolio = Portfolio {
        owner: "desk-7".into(),
        trades: vec![trade.clone(), Trade { seq: 1, ..trade }],
        positions: [("AAPL".to_string(), 400), ("MSFT".to_string(), -50)]
            .into_iter()
            .collect(),
        signature: vec![0xDE, 0xAD, 0xBE, 0xEF],
    };
    let bytes = encode(&portfolio)?;
    println!("  Encoded {} bytes", bytes.len());

    let mut decoded = Portfolio::default();
    decode(&bytes, &mut decoded)?;
    assert_eq!(decoded, portfolio);
    println!("  Round trip OK: {} trades, {} positions", decoded.trades.len(), decoded.positions.len());

    // Example 5: Little-endian configuration over a stream
    println!("\n5. Custom Configuration:");
    let codec = TaggedCodec::with_config(CodecConfig::new().with_endianness(Endianness::Little));
    let mut sink = Vec::new();
    codec.encode_to(&portfolio, &mut sink)?;
    let mut decoded = Portfolio::default();
    codec.decode_from(sink.as_slice(), &mut decoded)?;
    println!("  {} codec wrote {} bytes", codec.name(), sink.len());

    // Example 6: Missing required field
    println!("\n6. Error Handling:");
    let mut trade = Trade::default();
    match decode(&[0xC0], &mut trade) {
        Err(err) if err.is_missing_field() => println!("  Rejected: {}", err),
        other => println!("  Unexpected: {:?}", other),
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}
