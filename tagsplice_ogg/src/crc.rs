const POLYNOMIAL: u32 = 0x04C1_1DB7;

static CRC_TABLE: [u32; 256] = {
	let mut table = [0; 256];

	let mut i = 0;
	while i < 256 {
		let mut crc = (i as u32) << 24;

		let mut bit = 0;
		while bit < 8 {
			crc = if crc & 0x8000_0000 == 0 {
				crc << 1
			} else {
				(crc << 1) ^ POLYNOMIAL
			};
			bit += 1;
		}

		table[i] = crc;
		i += 1;
	}

	table
};

/// Calculates the Ogg page checksum of `data`
///
/// This is an MSB-first CRC-32 with the polynomial `0x04C11DB7`, a zero seed, and no final XOR.
/// When checking a page, the checksum field must be zeroed before hashing.
pub fn crc32(data: &[u8]) -> u32 {
	let mut crc = 0_u32;

	for &byte in data {
		let idx = ((crc >> 24) as u8) ^ byte;
		crc = (crc << 8) ^ CRC_TABLE[usize::from(idx)];
	}

	crc
}
