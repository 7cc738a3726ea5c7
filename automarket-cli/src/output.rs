use automarket_core::{Car, CarFilters, Company, FilterSession, FormErrors, Page};

pub fn print_car(title: &str, car: &Car) {
    println!("{title}");
    println!("id: {}", car.id);
    println!("title: {}", car.title());
    println!("price: {}", format_price(car.price));
    if let Some(mileage) = car.mileage {
        println!("mileage: {mileage} км");
    }
    if let Some(location) = &car.location {
        println!("location: {location}");
    }
    let spec = &car.specification;
    for (label, value) in [
        ("fuel_type", &spec.fuel_type),
        ("transmission", &spec.transmission),
        ("drive_type", &spec.drive_type),
        ("body_type", &spec.body_type),
        ("color", &spec.color),
        ("condition", &spec.condition),
    ] {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    if let Some(seller) = &car.seller {
        match &seller.phone {
            Some(phone) => println!("seller: {} ({phone})", seller.name),
            None => println!("seller: {}", seller.name),
        }
    }
    if let Some(cover) = car.cover_image() {
        println!("cover: {cover}");
    }
    println!("images: {}", car.images.len());
    if let Some(description) = &car.description {
        println!("description: {description}");
    }
    if let Some(created_at) = car.created_at {
        println!("created_at: {created_at}");
    }
}

pub fn print_cars(page: &Page<Car>) {
    println!(
        "Объявлений: {} (страница {}/{}, всего {})",
        page.items.len(),
        page.page,
        page.total_pages.max(1),
        page.total
    );
    for car in &page.items {
        let vip = if car.is_vip { " VIP" } else { "" };
        println!("- [{}] {} {}{vip}", car.id, car.title(), format_price(car.price));
    }
    if page.has_next() {
        println!("следующая страница: --page {}", page.page + 1);
    }
}

pub fn print_company<T: Company>(title: &str, company: &T) {
    let profile = company.profile();
    println!("{title}");
    println!("id: {}", company.id());
    println!("company_name: {}", profile.company_name);
    for (label, value) in [
        ("phone", &profile.phone),
        ("email", &profile.email),
        ("website", &profile.website),
        ("address", &profile.address),
        ("logo", &profile.logo),
        ("description", &profile.description),
    ] {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    if let Some(year) = profile.established_year {
        println!("established_year: {year}");
    }
    println!("cars: {}", company.car_count());
}

pub fn print_companies<T: Company>(page: &Page<T>) {
    println!(
        "Найдено: {} (страница {}/{}, всего {})",
        page.items.len(),
        page.page,
        page.total_pages.max(1),
        page.total
    );
    for company in &page.items {
        println!(
            "- [{}] {} (объявлений: {})",
            company.id(),
            company.profile().company_name,
            company.car_count()
        );
    }
}

pub fn print_filters(title: &str, filters: &CarFilters) {
    println!("{title} ({})", filters.active_count());
    for (field, value) in filters.active() {
        println!("  {}: {value}", field.key());
    }
}

pub fn print_session(session: &FilterSession) {
    print_filters("Применённые фильтры", session.applied());
    if session.is_dirty() {
        let pending: Vec<&str> = session
            .pending_fields()
            .into_iter()
            .map(|field| field.key())
            .collect();
        print_filters("Черновик", session.temp());
        println!("не применено: {}", pending.join(", "));
    }
}

pub fn print_form_errors(errors: &FormErrors) {
    for (field, message) in errors.iter() {
        eprintln!("  {field}: {message}");
    }
}

fn format_price(price: f64) -> String {
    format!("${price:.0}")
}
