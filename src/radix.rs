//! LSD radix sort over 32-bit keys with a carried 32-bit payload.
//!
//! Four 8-bit counting passes over ping-pong buffers: stable, linear in
//! the input length. This is the pair-sort primitive the shard sorter
//! runs over tens of millions of entries at a time.

/// Sort `keys` ascending, carrying `payload` through the same
/// permutation. Equal keys keep their input order.
pub fn sort_pairs(mut keys: Vec<u32>, mut payload: Vec<u32>) -> (Vec<u32>, Vec<u32>) {
    assert_eq!(keys.len(), payload.len());
    let n = keys.len();
    let mut keys_out = vec![0u32; n];
    let mut payload_out = vec![0u32; n];

    for pass in 0..4 {
        let shift = pass * 8;
        let mut counts = [0usize; 256];
        for &key in &keys {
            counts[(key >> shift) as usize & 0xff] += 1;
        }

        let mut offsets = [0usize; 256];
        let mut sum = 0usize;
        for bucket in 0..256 {
            offsets[bucket] = sum;
            sum += counts[bucket];
        }

        for i in 0..n {
            let bucket = (keys[i] >> shift) as usize & 0xff;
            keys_out[offsets[bucket]] = keys[i];
            payload_out[offsets[bucket]] = payload[i];
            offsets[bucket] += 1;
        }

        std::mem::swap(&mut keys, &mut keys_out);
        std::mem::swap(&mut payload, &mut payload_out);
    }

    // Four passes leave the sorted data back in the primary buffers.
    (keys, payload)
}
