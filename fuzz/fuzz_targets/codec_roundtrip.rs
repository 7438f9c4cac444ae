#![no_main]
use bec::{arithmetic, BinaryRangeAnsCoder, BitArray, OutputBitStream};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (Vec<u8>, u16, u8)| {
    let (mut message_bytes, probability_raw, frequency_raw) = data;
    let probability = f64::from(probability_raw) / f64::from(u16::MAX);
    let frequency_bits = u32::from(frequency_raw % 22) + 2; // 2 to 23 bits

    if message_bytes.is_empty() {
        return;
    }
    let bit_length = message_bytes.len() * 8;
    let message = BitArray::new(&mut message_bytes, bit_length).unwrap();

    // Arithmetic coder round trip.
    let mut sink = OutputBitStream::with_bit_capacity(bit_length);
    arithmetic::encode(&message, &mut sink, probability).unwrap();
    let mut encoded_bytes = sink.data().to_vec();
    let encoded = BitArray::new(&mut encoded_bytes, sink.bit_length()).unwrap();
    let mut bac_bytes = vec![0u8; message.byte_length()];
    let mut bac_decoded = BitArray::new(&mut bac_bytes, bit_length).unwrap();
    arithmetic::decode(&encoded, &mut bac_decoded, probability).unwrap();
    assert_eq!(bac_decoded.data(), message.data());

    // rANS round trip.
    let coder = BinaryRangeAnsCoder::new(probability, frequency_bits).unwrap();
    let mut rans_encoded = Vec::new();
    let state = coder.encode(&message, &mut rans_encoded);
    let mut rans_bytes = vec![0u8; message.byte_length()];
    let mut rans_decoded = BitArray::new(&mut rans_bytes, bit_length).unwrap();
    coder.decode(&rans_encoded, state, &mut rans_decoded);
    assert_eq!(rans_decoded.data(), message.data());
});
