use ed25519_dalek::SigningKey;
use vw_crypto::{compute_hmac, decrypt, encrypt, seal, verify, MasterKey, KEY_SIZE};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn bench_master() -> MasterKey {
    MasterKey::from_bytes([0x42u8; KEY_SIZE])
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let key = [0x42u8; KEY_SIZE];
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt(divan::black_box(&key), divan::black_box(&data)).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let key = [0x42u8; KEY_SIZE];
    let data = make_data(size);
    let (ciphertext, nonce) = encrypt(&key, &data).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            decrypt(
                divan::black_box(&key),
                divan::black_box(&ciphertext),
                divan::black_box(&nonce),
            )
            .unwrap()
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_hmac(bencher: divan::Bencher, size: usize) {
    let key = [0x42u8; KEY_SIZE];
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| compute_hmac(divan::black_box(&key), divan::black_box(&data)));
}

#[divan::bench(args = [1024, 65536])]
fn bench_seal(bencher: divan::Bencher, size: usize) {
    let master = bench_master();
    let signing = SigningKey::from_bytes(&[0x17u8; 32]);
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| seal("bench.bin", divan::black_box(&data), &master, &signing).unwrap());
}

#[divan::bench(args = [1024, 65536])]
fn bench_verify(bencher: divan::Bencher, size: usize) {
    let master = bench_master();
    let signing = SigningKey::from_bytes(&[0x17u8; 32]);
    let envelope = seal("bench.bin", &make_data(size), &master, &signing).unwrap();
    bencher.bench(|| verify(divan::black_box(&envelope)));
}

fn main() {
    divan::main();
}
