use bec::{BinaryRangeAnsCoder, BitArray};

fn main() {
    let bit_count = 10_000;
    let mut message_bytes = vec![0u8; bit_count / 8];
    for position in 0..bit_count {
        if (position * 7 + position / 5) % 10 < 3 {
            message_bytes[position / 8] |= 1 << (position % 8);
        }
    }
    let message = BitArray::new(&mut message_bytes, bit_count).unwrap();

    let mut coder = BinaryRangeAnsCoder::new(0.3, 10).unwrap();
    coder.build_encoder_table();
    coder.build_decoder_table();

    let mut decoded_bytes = vec![0u8; bit_count / 8];
    for _ in 0..1000 {
        let mut encoded = Vec::new();
        let state = coder.encode_using_table(&message, &mut encoded).unwrap();

        let mut decoded = BitArray::new(&mut decoded_bytes, bit_count).unwrap();
        coder.decode_using_table(&encoded, state, &mut decoded).unwrap();
        assert_eq!(decoded.data(), message.data());
    }
}
